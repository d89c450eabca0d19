//! Concrete query node implementations
//!
//! This module provides implementations of the `QueryNode` trait for
//! various query types.

mod bool_query;
mod fuzzy_query;
mod match_query;
mod phrase_query;
mod prefix_query;
mod range_query;
mod regexp_query;
mod term_query;
mod wildcard_query;

pub use bool_query::BoolQuery;
pub use fuzzy_query::FuzzyQuery;
pub use match_query::MatchQuery;
pub use phrase_query::PhraseQuery;
pub use prefix_query::PrefixQuery;
pub use range_query::{DateRangeQuery, NumericRangeQuery};
pub use regexp_query::RegexpQuery;
pub use term_query::TermQuery;
pub use wildcard_query::WildcardQuery;

fn default_boost() -> f32 {
    1.0
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{TimeZone, Utc};

    use crate::config::SourConfig;
    use crate::models::{Document, Field};
    use crate::query::QueryContext;
    use crate::Sour;

    pub fn sour() -> Sour {
        let doc = Document::new("A")
            .add_field(Field::keyword("name", "marty"))
            .add_field(Field::text("title", "software developer"))
            .add_field(Field::text("slogan", "code match"))
            .add_field(Field::numeric("level", 10.0))
            .add_field(Field::date_time(
                "created",
                Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap(),
            ))
            .add_field(Field::composite_all("_all"));
        Sour::with_document(SourConfig::default(), doc)
    }

    pub fn ctx(sour: &Sour) -> QueryContext<'_, Sour> {
        QueryContext::new(sour, sour.tokenizer().clone(), sour.config().similarity)
    }
}
