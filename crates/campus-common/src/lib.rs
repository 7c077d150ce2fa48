mod collection;
pub use collection::*;

mod schema;
pub use schema::*;

mod validation;
pub use validation::*;
