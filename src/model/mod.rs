mod nation;
mod province;
mod resource;
mod timestamp;
mod trade;
mod world;

pub use nation::{DiplomaticRelations, MilitaryPosture, Nation, NationId};
pub use province::{Building, Province, ProvinceId};
pub use resource::{CatalogError, Resource, ResourceCatalog, ResourceCategory};
pub use timestamp::{DAYS_PER_WEEK, SimTimestamp};
pub use trade::{
    AgreementStatus, DEFAULT_OFFER_DURATION_WEEKS, OFFER_EXPIRY_DAYS, OfferStatus, TradeAgreement,
    TradeOffer, TradeSide,
};
pub use world::{World, WorldError};
