use std::fmt::{Display, Formatter};

/// Named groups of documents served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Faculty,
    Program,
    News,
    Inquiry,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Faculty => "faculty",
            Collection::Program => "program",
            Collection::News => "news",
            Collection::Inquiry => "inquiry",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
