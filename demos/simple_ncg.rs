use fmin::{LineSearchDescent, LinearCG, NonlinearCG, Rn};
use ndarray::array;

fn quad2d(x: &Rn<f64>, grad: &mut Rn<f64>) -> f64 {
    assert_eq!(x.len(), 2);
    assert_eq!(grad.len(), 2);

    grad[0] = 2. * x[0];
    grad[1] = 20. * x[1];

    x[0].powi(2) + 10. * x[1].powi(2)
}

fn main() {
    let m = NonlinearCG::<f64>::new();

    let mut ev: Vec<f64> = vec![];

    let r = {
        let f = |x: &f64, grad: &mut f64| { ev.push(*x); *grad = 2. * x; x * x };
        m.minimize(&1f64, f)
    };

    println!("f(x) = x^2");
    println!("\tNCG result: {:?}", r);
    println!("\tEvaluations: x = {:?}", ev);

    println!("f(x) = x1^2 + 10 x2^2");

    let mut history = vec![];
    let r = m.minimize_with_history(&Rn::new(vec![1., 1.]), quad2d, &mut history);
    for h in &history {
        println!("\t{:?}, f = {:e}, alpha = {}", *h.x, h.fx, h.alpha);
    }
    println!("\tNCG result: {:?}", r);

    let mut history = vec![];
    let r = LineSearchDescent::<f64>::new()
        .minimize_with_history(&Rn::new(vec![1., 1.]), quad2d, &mut history);
    println!("\tline search descent: {} iterations, {} evaluations, f = {:e}",
             r.iterations,
             history.iter().map(|h| h.function_calls.len()).sum::<usize>(),
             r.fx);

    println!("[[10, 8], [8, 10]] x = [34, 38]");
    let mut x = array![0., 0.];
    match LinearCG::<f64>::new().solve(&array![[10., 8.], [8., 10.]], &array![34., 38.], &mut x) {
        Ok(report) => println!("\tx = {}, {:?}", x, report),
        Err(e) => println!("\terror: {}", e),
    }
}
