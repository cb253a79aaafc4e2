use crate::models::access_log::{AccessAction, AccessLog};
use crate::models::card::{Card, CardStatus};
use crate::models::route::Route;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use serde::Serialize;

/// Headline counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_routes: usize,
    pub total_vehicles: usize,
    pub active_cards: usize,
    pub access_granted: usize,
    pub access_denied: usize,
}

impl DashboardStats {
    pub fn collect(
        users: &[User],
        routes: &[Route],
        vehicles: &[Vehicle],
        cards: &[Card],
        logs: &[AccessLog],
    ) -> Self {
        let count_action = |action: AccessAction| logs.iter().filter(|l| l.action_type == action).count();

        Self {
            total_users: users.len(),
            total_routes: routes.len(),
            total_vehicles: vehicles.len(),
            active_cards: cards.iter().filter(|c| c.status == CardStatus::Active).count(),
            access_granted: count_action(AccessAction::AccessGranted),
            access_denied: count_action(AccessAction::AccessDenied),
        }
    }
}
