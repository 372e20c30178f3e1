//! Optional startup seeding of a random customer for local development.

use crm_core::customer::{CustomerRegistration, Gender};
use crm_core::error::CoreError;
use crm_core::service::CustomerService;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Password given to every seeded customer.
pub const SEED_PASSWORD: &str = "password";

const SEED_EMAIL_DOMAIN: &str = "fileupload.com";

const FIRST_NAMES: &[&str] = &[
    "Amara", "Bruno", "Chen", "Dalia", "Emeka", "Freya", "Goran", "Hana", "Ivo", "Jamila",
    "Kofi", "Lena", "Mateo", "Nadia", "Oskar", "Priya",
];

const LAST_NAMES: &[&str] = &[
    "Adeyemi", "Bianchi", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Horvat",
    "Ito", "Jansen", "Kowalski", "Larsen", "Moreau", "Novak", "Okafor", "Petrov",
];

/// Build a random registration: age in `16..99`, gender by age parity, and an
/// email derived from the name.
pub fn random_registration() -> CustomerRegistration {
    let mut rng = rand::rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Doe");
    let age: i32 = rng.random_range(16..99);
    let gender = if age % 2 == 0 {
        Gender::Male
    } else {
        Gender::Female
    };

    CustomerRegistration {
        name: format!("{first} {last}"),
        email: format!(
            "{}.{}@{SEED_EMAIL_DOMAIN}",
            first.to_lowercase(),
            last.to_lowercase()
        ),
        password: SEED_PASSWORD.to_string(),
        age,
        gender,
    }
}

/// Register one random customer, logging its email.
///
/// A name collision with an existing customer is logged and skipped.
pub async fn seed_random_customer(customers: &CustomerService) -> Result<(), CoreError> {
    let registration = random_registration();
    let email = registration.email.clone();

    match customers.register(registration).await {
        Ok(customer) => {
            tracing::info!(customer_id = customer.id, %email, "Seeded random customer");
            Ok(())
        }
        Err(CoreError::Conflict(_)) => {
            tracing::warn!(%email, "Seed customer already exists, skipping");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
