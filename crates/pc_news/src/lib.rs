pub mod markup;
pub mod naver;
pub mod query;

pub use naver::{DisabledNewsSource, NaverNewsClient, NewsConfig};
pub use query::optimize_query;

pub mod prelude {
    pub use super::naver::{DisabledNewsSource, NaverNewsClient, NewsConfig};
    pub use pc_core::{NewsItem, NewsSource, Result, Error};
}
