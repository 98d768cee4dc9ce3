use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::AppResult;
use crate::gateway::DataGateway;
use crate::models::{NewProduct, Product};

static FRUITS: &[&str] = &[
    "Manzana", "Pera", "Plátano", "Naranja", "Mandarina", "Limón", "Fresa",
    "Uva", "Kiwi", "Mango", "Piña", "Melón", "Sandía", "Cereza", "Melocotón",
    "Ciruela", "Higo", "Granada", "Aguacate", "Papaya",
];

static VARIETIES: &[&str] = &[
    "Golden", "Fuji", "Conferencia", "Canaria", "Valencia", "Ecológica",
    "Roja", "Verde", "Blanca", "Temprana", "de temporada", "Extra",
];

/// Generate a product name using fruit + variety + serial suffix.
fn random_product_name(rng: &mut impl Rng, serial: usize) -> String {
    let fruit = FRUITS.choose(rng).unwrap_or(&"Manzana");
    let variety = VARIETIES.choose(rng).unwrap_or(&"Extra");
    format!("{} {} #{:03}", fruit, variety, serial)
}

/// A random demo product. Expiration dates spread from a few days past to
/// two months ahead so every badge shows up; roughly one in ten has none.
pub fn random_product(rng: &mut impl Rng, serial: usize, today: NaiveDate) -> NewProduct {
    let expiration_date = if rng.gen_bool(0.9) {
        let offset = rng.gen_range(-5..=60);
        Some((today + Duration::days(offset)).format("%Y-%m-%d").to_string())
    } else {
        None
    };

    NewProduct {
        name: random_product_name(rng, serial),
        // Whole cents, 0.50 – 8.99 per unit
        price: f64::from(rng.gen_range(50u32..=899)) / 100.0,
        stock: rng.gen_range(0..=200),
        expiration_date,
    }
}

/// Create `count` random products through `gateway`.
pub async fn seed_products(
    gateway: &dyn DataGateway,
    count: usize,
    today: NaiveDate,
) -> AppResult<Vec<Product>> {
    info!("Seeding {} products...", count);

    // StdRng is Send, so it can live across the awaits below
    let mut rng = StdRng::from_entropy();
    let mut created = Vec::with_capacity(count);
    for serial in 1..=count {
        let product = random_product(&mut rng, serial, today);
        created.push(gateway.create_product(&product).await?);
    }

    info!("Seeding complete. Total: {} products", created.len());
    Ok(created)
}
