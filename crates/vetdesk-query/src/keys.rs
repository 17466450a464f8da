// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache keys for clinic resources, shared by readers and invalidators.

use crate::key::QueryKey;

pub const APPOINTMENTS: &str = "appointments";
pub const APPOINTMENT: &str = "appointment";
pub const QUEUE: &str = "queue";
pub const NOTIFICATIONS: &str = "notifications";
pub const PETS: &str = "pets";
pub const PET: &str = "pet";
pub const SHIFTS: &str = "shifts";
pub const TESTS: &str = "tests";
pub const VACCINATIONS: &str = "vaccinations";
pub const CHAT: &str = "chat";

/// Every appointment list, whatever the date.
pub fn appointments() -> QueryKey {
    QueryKey::new(APPOINTMENTS)
}

/// The appointment list for one day (`"all"` when unfiltered).
pub fn appointments_on(date: Option<chrono::NaiveDate>) -> QueryKey {
    match date {
        Some(date) => appointments().with(date.format("%Y-%m-%d")),
        None => appointments().with("all"),
    }
}

pub fn appointment(id: impl ToString) -> QueryKey {
    QueryKey::new(APPOINTMENT).with(id)
}

pub fn queue() -> QueryKey {
    QueryKey::new(QUEUE)
}

pub fn notifications() -> QueryKey {
    QueryKey::new(NOTIFICATIONS)
}

pub fn pets() -> QueryKey {
    QueryKey::new(PETS)
}

pub fn pet(id: impl ToString) -> QueryKey {
    QueryKey::new(PET).with(id)
}

pub fn shifts() -> QueryKey {
    QueryKey::new(SHIFTS)
}

pub fn test(id: impl ToString) -> QueryKey {
    QueryKey::new(TESTS).with(id)
}

/// Lab tests of one pet: `["tests", "pet", id]`.
pub fn tests_for_pet(pet_id: impl ToString) -> QueryKey {
    QueryKey::new(TESTS).with("pet").with(pet_id)
}

pub fn vaccinations_for_pet(pet_id: impl ToString) -> QueryKey {
    QueryKey::new(VACCINATIONS).with(pet_id)
}

pub fn chat(conversation_id: &str) -> QueryKey {
    QueryKey::new(CHAT).with(conversation_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_lists_fall_under_the_appointments_prefix() {
        let day = chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(appointments_on(Some(day)).to_string(), "appointments/2026-10-16");
        assert!(appointments_on(None).starts_with(&appointments()));
        assert!(!appointment(42).starts_with(&appointments()));
    }

    #[test]
    fn pet_tests_do_not_collide_with_test_ids() {
        assert_eq!(tests_for_pet(7).segments(), ["tests", "pet", "7"]);
        assert_eq!(test(7).segments(), ["tests", "7"]);
    }
}
