//! Domain models for the site and the CMS.
//!
//! Each entity module holds the validated domain type returned by the
//! repositories, the loosely typed `*Input` that admin forms post, and the
//! `New*`/`*Changes` values the repositories write.

pub mod admin;
pub mod category;
pub mod contact_message;
pub mod content_block;
pub mod event;
pub mod franchise_plan;
pub mod input;
pub mod product;
pub mod promotion;
pub mod session;
pub mod store;

pub use admin::Admin;
pub use category::{
    Category, CategoryChanges, CategoryDetail, CategoryInput, CategoryRef, CategoryWithCount,
    NewCategory, PublicCategory,
};
pub use contact_message::{ContactInput, ContactMessage, NewContactMessage, ReadStatusInput};
pub use content_block::{ContentBlock, ContentBlockUpsert, ContentPayload};
pub use event::{Event, EventChanges, EventInput, NewEvent};
pub use franchise_plan::{FranchisePlan, FranchisePlanFields, FranchisePlanInput};
pub use input::ValidationError;
pub use product::{
    NewProduct, NewSize, NewTopping, Product, ProductChanges, ProductFilter, ProductInput,
    ProductSize, ProductTopping,
};
pub use promotion::{NewPromotion, Promotion, PromotionChanges, PromotionInput};
pub use session::{CurrentAdmin, keys as session_keys};
pub use store::{NewStore, Store, StoreChanges, StoreInput};
