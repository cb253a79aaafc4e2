//! Per-resource descriptors.
//!
//! Each remote collection is described once by a zero-sized marker type
//! implementing [`Resource`]. Capabilities beyond fetching are opt-in through
//! [`Creatable`], [`Updatable`] and [`Deletable`], so the dispatcher only
//! exposes operations the backend actually supports for that collection.

use crate::models::access_log::{AccessLog, AccessLogDraft};
use crate::models::card::{Card, CardDraft, CardPatch};
use crate::models::category::Category;
use crate::models::gps::GpsLocation;
use crate::models::permission::{Permission, PermissionDraft, PermissionPatch};
use crate::models::route::{Route, RouteDraft, RoutePatch};
use crate::models::user::{User, UserPatch};
use crate::models::vehicle::{Vehicle, VehicleDraft, VehiclePatch};
use crate::models::Validate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub trait Resource: Send + Sync + 'static {
    type Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection name, used as the store key and in logs
    const NAME: &'static str;
    /// Collection path on the REST backend
    const PATH: &'static str;
    /// Noun used in fetch failure messages ("users", "GPS locations")
    const PLURAL: &'static str;
    /// Noun used in mutation failure messages ("user", "access log")
    const SINGULAR: &'static str;

    fn fetch_failed() -> String {
        format!("Failed to fetch {}", Self::PLURAL)
    }
}

pub trait Keyed: Resource {
    type Id: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn id(entity: &Self::Entity) -> Self::Id;

    fn item_path(id: Self::Id) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

pub trait Creatable: Resource {
    type Draft: Serialize + Validate + Send + Sync;

    const CREATE_VERB: &'static str = "create";

    fn create_failed() -> String {
        format!("Failed to {} {}", Self::CREATE_VERB, Self::SINGULAR)
    }
}

pub trait Updatable: Keyed {
    type Patch: Serialize + Validate + Send + Sync;

    fn update_failed() -> String {
        format!("Failed to update {}", Self::SINGULAR)
    }
}

pub trait Deletable: Keyed {
    fn delete_failed() -> String {
        format!("Failed to delete {}", Self::SINGULAR)
    }
}

pub struct Users;
pub struct Vehicles;
pub struct Routes;
pub struct Cards;
pub struct Categories;
pub struct Permissions;
pub struct AccessLogs;
pub struct GpsLocations;

impl Resource for Users {
    type Entity = User;
    const NAME: &'static str = "users";
    const PATH: &'static str = "/users";
    const PLURAL: &'static str = "users";
    const SINGULAR: &'static str = "user";
}

impl Keyed for Users {
    type Id = i64;

    fn id(entity: &User) -> i64 {
        entity.user_id
    }
}

impl Updatable for Users {
    type Patch = UserPatch;
}

impl Deletable for Users {}

impl Resource for Vehicles {
    type Entity = Vehicle;
    const NAME: &'static str = "vehicles";
    const PATH: &'static str = "/vehicles";
    const PLURAL: &'static str = "vehicles";
    const SINGULAR: &'static str = "vehicle";
}

impl Keyed for Vehicles {
    type Id = i64;

    fn id(entity: &Vehicle) -> i64 {
        entity.vehicle_id
    }
}

impl Creatable for Vehicles {
    type Draft = VehicleDraft;
}

impl Updatable for Vehicles {
    type Patch = VehiclePatch;
}

impl Deletable for Vehicles {}

impl Resource for Routes {
    type Entity = Route;
    const NAME: &'static str = "routes";
    const PATH: &'static str = "/routes";
    const PLURAL: &'static str = "routes";
    const SINGULAR: &'static str = "route";
}

impl Keyed for Routes {
    type Id = i64;

    fn id(entity: &Route) -> i64 {
        entity.route_id
    }
}

impl Creatable for Routes {
    type Draft = RouteDraft;
}

impl Updatable for Routes {
    type Patch = RoutePatch;
}

impl Deletable for Routes {}

impl Resource for Cards {
    type Entity = Card;
    const NAME: &'static str = "cards";
    const PATH: &'static str = "/cards";
    const PLURAL: &'static str = "cards";
    const SINGULAR: &'static str = "card";
}

impl Keyed for Cards {
    type Id = i64;

    fn id(entity: &Card) -> i64 {
        entity.card_id
    }
}

impl Creatable for Cards {
    type Draft = CardDraft;
}

impl Updatable for Cards {
    type Patch = CardPatch;
}

impl Deletable for Cards {}

impl Resource for Categories {
    type Entity = Category;
    const NAME: &'static str = "categories";
    const PATH: &'static str = "/categories";
    const PLURAL: &'static str = "categories";
    const SINGULAR: &'static str = "category";
}

impl Resource for Permissions {
    type Entity = Permission;
    const NAME: &'static str = "permissions";
    const PATH: &'static str = "/permissions";
    const PLURAL: &'static str = "permissions";
    const SINGULAR: &'static str = "permission";
}

impl Keyed for Permissions {
    type Id = i64;

    fn id(entity: &Permission) -> i64 {
        entity.permission_id
    }
}

impl Creatable for Permissions {
    type Draft = PermissionDraft;
}

impl Updatable for Permissions {
    type Patch = PermissionPatch;
}

impl Deletable for Permissions {}

impl Resource for AccessLogs {
    type Entity = AccessLog;
    const NAME: &'static str = "access_logs";
    const PATH: &'static str = "/access_logs";
    const PLURAL: &'static str = "access logs";
    const SINGULAR: &'static str = "access log";
}

impl Creatable for AccessLogs {
    type Draft = AccessLogDraft;
    const CREATE_VERB: &'static str = "add";
}

impl Resource for GpsLocations {
    type Entity = GpsLocation;
    const NAME: &'static str = "gps";
    const PATH: &'static str = "/gps";
    const PLURAL: &'static str = "GPS locations";
    const SINGULAR: &'static str = "GPS location";
}
