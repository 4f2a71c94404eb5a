//! Seed the catalogue with sample plants.
//!
//! The seed file names one seller and a list of listings:
//!
//! ```yaml
//! seller:
//!   email: ivy@example.com
//!   name: Ivy Green
//! plants:
//!   - name: Monstera Deliciosa
//!     category: Indoor
//!     price: 24.5
//!     quantity: 12
//!     image: https://i.ibb.co/sample/monstera.jpg
//! ```
//!
//! The seller is upserted with the `seller` role so the listings have an owner
//! who can manage them.

use std::path::Path;

use plantnet_core::models::{ContactInfo, NewPlant};
use plantnet_core::{Email, Role};
use plantnet_server::db::{PlantRepository, UserRepository};
use serde::Deserialize;
use tracing::info;

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    seller: SeedSeller,
    plants: Vec<NewPlant>,
}

#[derive(Debug, Deserialize)]
struct SeedSeller {
    email: Email,
    name: Option<String>,
    image: Option<String>,
}

/// Parse and validate a seed file, returning each plant with its stock.
fn parse(content: &str) -> Result<(ContactInfo, Vec<(NewPlant, i32)>), CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    let seller = ContactInfo {
        name: file.seller.name,
        email: file.seller.email,
        image: file.seller.image,
    };
    let plants = file
        .plants
        .into_iter()
        .map(|plant| match plant.validate() {
            Ok(quantity) => Ok((plant, quantity)),
            Err(reason) => Err(CommandError::InvalidPlant {
                name: plant.name,
                reason,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((seller, plants))
}

/// Insert the plants listed in `file_path`.
///
/// The whole file is validated before connecting, so a bad entry inserts
/// nothing.
///
/// # Errors
///
/// Returns `CommandError` if the file is unreadable or invalid, or a database
/// write fails.
pub async fn plants(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    let content = tokio::fs::read_to_string(path).await?;
    let (seller, plants) = parse(&content)?;
    info!(plants = plants.len(), seller = %seller.email, "Seed file validated");

    let pool = connect().await?;
    UserRepository::new(&pool)
        .upsert_role(&seller.email, Role::Seller)
        .await?;

    let repo = PlantRepository::new(&pool);
    for (plant, quantity) in &plants {
        let created = repo.create(plant, *quantity, &seller).await?;
        info!(id = %created.id, name = %created.name, "Plant inserted");
    }

    info!("Seeding complete! {} plants inserted", plants.len());
    pool.close().await;
    Ok(())
}
