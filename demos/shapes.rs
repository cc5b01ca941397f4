use sovran_multimethod::{register_signature, signature, DispatchError, DispatchRegistry};
use tracing_subscriber::EnvFilter;

struct Circle {
    radius: f64,
}

struct Rect {
    width: f64,
    height: f64,
}

struct Triangle {
    base: f64,
    height: f64,
}

/// Area and collision functions dispatched on concrete shape types
fn main() -> Result<(), DispatchError> {
    // RUST_LOG=sovran_multimethod=trace shows every registration and dispatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = DispatchRegistry::new();

    let area = register_signature(signature![Circle])
        .doc("Area of a single shape")
        .register(&registry, "area", |c: Circle| {
            std::f64::consts::PI * c.radius * c.radius
        })?;
    registry.register_fn("area", |r: Rect| r.width * r.height)?;
    registry.register_fn("area", |t: Triangle| t.base * t.height / 2.0)?;

    println!("circle:   {:.2}", area.call((Circle { radius: 1.0 },))?);
    println!(
        "rect:     {:.2}",
        area.call((Rect {
            width: 2.0,
            height: 3.0
        },))?
    );
    println!(
        "triangle: {:.2}",
        area.call((Triangle {
            base: 4.0,
            height: 5.0
        },))?
    );

    // Double dispatch: the pair of types picks the implementation
    let collide = registry.register_fn("collide", |_: Circle, _: Circle| "circle/circle")?;
    registry.register_fn("collide", |_: Circle, _: Rect| "circle/rect")?;
    registry.register_fn("collide", |_: Rect, _: Circle| "rect/circle")?;

    let unit = || Rect {
        width: 1.0,
        height: 1.0,
    };
    println!("{}", collide.call((Circle { radius: 1.0 }, unit()))?);
    println!("{}", collide.call((unit(), Circle { radius: 1.0 }))?);

    match collide.call((unit(), unit())) {
        Ok(kind) => println!("{}", kind),
        Err(e) => println!("Error: {}", e),
    }

    println!("\n{} supports:", collide.display_name()?);
    for signature in collide.signatures()? {
        println!("  {}", signature);
    }
    // metadata follows the most recent registration
    println!("area: {:?}", area.metadata()?);

    Ok(())
}
