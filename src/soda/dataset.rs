/// How a dataset's endpoint expects page windows and filters in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// `$limit`/`$offset`/`$order` plus a SoQL `$where`.
    Soda,
    /// `per_page` and a 1-based `page`, with filters as plain `field=value`
    /// pairs. Used by the Urban Institute education data API.
    PerPage,
}

/// A resource endpoint and the sort key that makes paging deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub base_url: String,
    pub order: String,
    pub paging: Paging,
}

impl Dataset {
    pub fn new(base_url: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            order: order.into(),
            paging: Paging::Soda,
        }
    }

    /// USAC E-Rate recipient details and commitments.
    pub fn erate() -> Self {
        Self::new(
            "https://opendata.usac.org/resource/avi8-svp9.json",
            "funding_year DESC",
        )
    }

    /// IMLS public libraries survey.
    pub fn libraries() -> Self {
        Self::new("https://data.imls.gov/resource/fpin-fu7m.json", "stabr")
    }

    /// NCES Common Core of Data school directory for 2022, served by the
    /// Urban Institute. The API orders results itself.
    pub fn schools() -> Self {
        Self {
            base_url: "https://educationdata.urban.org/api/v1/schools/ccd/directory/2022".into(),
            order: String::new(),
            paging: Paging::PerPage,
        }
    }
}
