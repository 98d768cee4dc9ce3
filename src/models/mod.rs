mod movement;
mod product;

pub use movement::{Movement, MovementForm, MovementKind, NewMovement};
pub use product::{NewProduct, Product, ProductForm};
