pub mod enrichment;
pub mod providers;
pub mod recommender;
pub mod similarity;
pub mod store;
pub mod title_search;

pub use recommender::Recommender;
pub use similarity::SimilarityModel;
pub use store::ModelStore;
