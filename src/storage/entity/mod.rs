pub mod alert;
pub mod distribution_record;
pub mod rainfall_record;
pub mod refresh_meta;
pub mod region;
pub mod region_summary;
pub mod resource;

pub use alert::Entity as Alert;
pub use distribution_record::Entity as DistributionRecord;
pub use rainfall_record::Entity as RainfallRecord;
pub use refresh_meta::Entity as RefreshMeta;
pub use region::Entity as Region;
pub use region_summary::Entity as RegionSummary;
pub use resource::Entity as Resource;
