// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Patient (pet) records.

use vetdesk_core::types::{NewPet, Pet};
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn list(client: &ApiClient) -> Result<Vec<Pet>, VetdeskError> {
    client.get("pets").await
}

pub async fn get(client: &ApiClient, pet_id: i64) -> Result<Pet, VetdeskError> {
    client.get(&format!("pet/{pet_id}")).await
}

pub async fn create(client: &ApiClient, pet: &NewPet) -> Result<Pet, VetdeskError> {
    client.post("pet", pet).await
}
