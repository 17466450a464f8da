// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vaccination history.

use vetdesk_core::types::{NewVaccination, Vaccination};
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn for_pet(client: &ApiClient, pet_id: i64) -> Result<Vec<Vaccination>, VetdeskError> {
    client.get(&format!("vaccinations/pet/{pet_id}")).await
}

pub async fn create(
    client: &ApiClient,
    vaccination: &NewVaccination,
) -> Result<Vaccination, VetdeskError> {
    client.post("vaccination/create", vaccination).await
}
