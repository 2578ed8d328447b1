pub mod bestsellers_parser;
pub mod errors;
pub mod traits;

pub use bestsellers_parser::BestsellersParser;
pub use errors::ParserError;
pub use traits::CatalogSource;
