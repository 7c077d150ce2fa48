mod root;
pub use root::*;

mod content;
pub use content::*;

mod inquiries;
pub use inquiries::*;

mod seed;
pub use seed::*;

mod diagnostics;
pub use diagnostics::*;
