// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clinic resources bound to cache keys.
//!
//! Each read returns a [`QueryHandle`] with the staleness window suited to
//! how fast that resource changes. Each write goes through
//! [`QueryClient::mutate`] and names the queries it makes stale.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::FutureExt;
use vetdesk_client::services::{appointments, chat, lab_tests, notifications, patients, shifts, vaccines};
use vetdesk_client::ApiClient;
use vetdesk_core::types::{
    LabTest, NewAppointment, NewChatMessage, NewPet, NewVaccination, Pet, ShiftInput, Vaccination,
    WalkInRegistration,
};
use vetdesk_core::{
    Appointment, AppointmentId, ChatMessage, EntityId, Notification, Shift, VetdeskError,
};
use vetdesk_query::{keys, Fetcher, QueryClient, QueryHandle, QueryKey, QueryOptions};

pub const APPOINTMENTS_STALE: Duration = Duration::from_secs(30);
pub const QUEUE_STALE: Duration = Duration::ZERO;
pub const NOTIFICATIONS_STALE: Duration = Duration::ZERO;
pub const PETS_STALE: Duration = Duration::from_secs(5 * 60);
pub const SHIFTS_STALE: Duration = Duration::from_secs(60);
pub const TESTS_STALE: Duration = Duration::from_secs(60);
pub const CHAT_STALE: Duration = Duration::ZERO;

#[derive(Clone)]
pub struct ClinicQueries {
    client: ApiClient,
    cache: QueryClient,
}

impl ClinicQueries {
    pub fn new(client: ApiClient, cache: QueryClient) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    /// The given staleness window with the cache's default retry policy.
    fn options(&self, stale: Duration) -> QueryOptions {
        QueryOptions::stale_for(stale).with_retry(self.cache.defaults().retry())
    }

    fn bind<T, F, Fut>(&self, key: QueryKey, stale: Duration, request: F) -> QueryHandle<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, VetdeskError>> + Send + 'static,
    {
        let client = self.client.clone();
        let fetcher: Fetcher<T> = Arc::new(move || request(client.clone()).boxed());
        QueryHandle::new(self.cache.clone(), key, self.options(stale), fetcher)
    }

    pub fn appointments(&self, date: Option<NaiveDate>) -> QueryHandle<Vec<Appointment>> {
        self.bind(keys::appointments_on(date), APPOINTMENTS_STALE, move |client| async move {
            appointments::list(&client, date).await
        })
    }

    pub fn appointment(&self, id: AppointmentId) -> QueryHandle<Appointment> {
        self.bind(keys::appointment(id), APPOINTMENTS_STALE, move |client| async move {
            appointments::get(&client, id).await
        })
    }

    pub fn queue(&self) -> QueryHandle<Vec<Appointment>> {
        self.bind(keys::queue(), QUEUE_STALE, |client| async move {
            appointments::queue(&client).await
        })
    }

    pub fn notifications(&self) -> QueryHandle<Vec<Notification>> {
        self.bind(keys::notifications(), NOTIFICATIONS_STALE, |client| async move {
            notifications::list(&client).await
        })
    }

    pub fn pets(&self) -> QueryHandle<Vec<Pet>> {
        self.bind(keys::pets(), PETS_STALE, |client| async move {
            patients::list(&client).await
        })
    }

    pub fn pet(&self, pet_id: i64) -> QueryHandle<Pet> {
        self.bind(keys::pet(pet_id), PETS_STALE, move |client| async move {
            patients::get(&client, pet_id).await
        })
    }

    pub fn vaccinations(&self, pet_id: i64) -> QueryHandle<Vec<Vaccination>> {
        self.bind(keys::vaccinations_for_pet(pet_id), PETS_STALE, move |client| async move {
            vaccines::for_pet(&client, pet_id).await
        })
    }

    pub fn shifts(&self) -> QueryHandle<Vec<Shift>> {
        self.bind(keys::shifts(), SHIFTS_STALE, |client| async move {
            shifts::list(&client).await
        })
    }

    pub fn test(&self, test_id: EntityId) -> QueryHandle<LabTest> {
        self.bind(keys::test(&test_id), TESTS_STALE, move |client| {
            let test_id = test_id.clone();
            async move { lab_tests::get(&client, &test_id).await }
        })
    }

    pub fn tests_for_pet(&self, pet_id: i64) -> QueryHandle<Vec<LabTest>> {
        self.bind(keys::tests_for_pet(pet_id), TESTS_STALE, move |client| async move {
            lab_tests::for_pet(&client, pet_id).await
        })
    }

    pub fn chat_history(&self, conversation_id: &str) -> QueryHandle<Vec<ChatMessage>> {
        let conversation = conversation_id.to_string();
        self.bind(keys::chat(conversation_id), CHAT_STALE, move |client| {
            let conversation = conversation.clone();
            async move { chat::history(&client, &conversation).await }
        })
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, VetdeskError> {
        self.cache
            .mutate(
                appointments::create(&self.client, appointment),
                &[keys::appointments()],
            )
            .await
    }

    pub async fn register_walk_in(
        &self,
        registration: &WalkInRegistration,
    ) -> Result<Appointment, VetdeskError> {
        self.cache
            .mutate(
                appointments::register_walk_in(&self.client, registration),
                &[keys::appointments(), keys::queue()],
            )
            .await
    }

    pub async fn create_pet(&self, pet: &NewPet) -> Result<Pet, VetdeskError> {
        self.cache
            .mutate(patients::create(&self.client, pet), &[keys::pets()])
            .await
    }

    pub async fn record_vaccination(&self, vaccination: &NewVaccination) -> Result<Vaccination, VetdeskError> {
        self.cache
            .mutate(
                vaccines::create(&self.client, vaccination),
                &[keys::vaccinations_for_pet(vaccination.pet_id)],
            )
            .await
    }

    pub async fn create_shift(&self, shift: &ShiftInput) -> Result<Shift, VetdeskError> {
        self.cache
            .mutate(shifts::create(&self.client, shift), &[keys::shifts()])
            .await
    }

    pub async fn update_shift(&self, shift_id: i64, shift: &ShiftInput) -> Result<Shift, VetdeskError> {
        self.cache
            .mutate(shifts::update(&self.client, shift_id, shift), &[keys::shifts()])
            .await
    }

    pub async fn delete_shift(&self, shift_id: i64) -> Result<(), VetdeskError> {
        self.cache
            .mutate(shifts::delete(&self.client, shift_id), &[keys::shifts()])
            .await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), VetdeskError> {
        self.cache
            .mutate(
                notifications::mark_read(&self.client, notification_id),
                &[keys::notifications()],
            )
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), VetdeskError> {
        self.cache
            .mutate(notifications::mark_all_read(&self.client), &[keys::notifications()])
            .await
    }

    pub async fn dismiss_notification(&self, notification_id: &str) -> Result<(), VetdeskError> {
        self.cache
            .mutate(
                notifications::dismiss(&self.client, notification_id),
                &[keys::notifications()],
            )
            .await
    }

    pub async fn send_chat(&self, message: &NewChatMessage) -> Result<ChatMessage, VetdeskError> {
        self.cache
            .mutate(
                chat::send(&self.client, message),
                &[keys::chat(&message.conversation_id)],
            )
            .await
    }
}
