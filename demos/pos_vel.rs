use ecs_registry::prelude::*;

// Component types only need to be Clone + Send + Sync + 'static; the
// registry picks up a type's identity the first time it sees it.

#[derive(Clone, Debug)]
struct Pos {
    x: f32,
    y: f32,
}

#[derive(Clone, Debug)]
struct Vel {
    x: f32,
    y: f32,
}

fn main() {
    let mut registry = Registry::new();

    let e1 = registry.create_entity();
    registry.set(e1, Pos { x: 0., y: 0. });
    registry.set(e1, Vel { x: 3.0, y: 1.0 });

    let e2 = registry.create_entity();
    registry.set(e2, Pos { x: 0., y: 100. });
    registry.set(e2, Vel { x: 0.0, y: -1.0 });

    for _ in 0..10 {
        for (_, (pos, vel)) in registry.view_mut::<(&mut Pos, &Vel), ()>() {
            pos.x += vel.x;
            pos.y += vel.y;
        }

        println!("=====");
        for (entity, (pos, vel)) in registry.view::<(&Pos, &Vel), ()>() {
            println!("{entity}: {pos:?} - {vel:?}");
        }
    }
}
