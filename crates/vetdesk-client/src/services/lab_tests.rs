// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lab tests and their results.

use vetdesk_core::types::LabTest;
use vetdesk_core::{EntityId, VetdeskError};

use crate::http::segment;
use crate::ApiClient;

pub async fn get(client: &ApiClient, test_id: &EntityId) -> Result<LabTest, VetdeskError> {
    client
        .get(&format!("test/{}", segment(&test_id.to_string())))
        .await
}

pub async fn for_pet(client: &ApiClient, pet_id: i64) -> Result<Vec<LabTest>, VetdeskError> {
    client.get(&format!("tests/pet/{pet_id}")).await
}
