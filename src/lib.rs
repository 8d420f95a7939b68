pub mod export;
pub mod id;
pub mod model;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use id::IdGenerator;
pub use model::{
    AgreementStatus, Building, CatalogError, DiplomaticRelations, MilitaryPosture, Nation,
    NationId, OfferStatus, Province, ProvinceId, Resource, ResourceCatalog, ResourceCategory,
    SimTimestamp, TradeAgreement, TradeOffer, TradeSide, World, WorldError,
};
