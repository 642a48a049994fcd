use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use erate_prospector::analysis::opportunity::poverty_rate;
use erate_prospector::fetch::HttpClient;
use erate_prospector::output::{load_table, persist};
use erate_prospector::{Dataset, FilterSet, SodaClient, SummaryRequest, summarize};
use serde_json::{Value, json};

/// Fake SODA endpoint holding rows per funding year.
struct FakePortal {
    years: HashMap<i64, Vec<Value>>,
}

#[async_trait]
impl HttpClient for FakePortal {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let params: HashMap<String, String> = req.url().query_pairs().into_owned().collect();
        let limit: usize = params["$limit"].parse().unwrap();
        let offset: usize = params["$offset"].parse().unwrap();
        let year: i64 = params["$where"]
            .split(" AND ")
            .find_map(|c| c.strip_prefix("funding_year = "))
            .unwrap()
            .parse()
            .unwrap();

        let rows: Vec<Value> = self
            .years
            .get(&year)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        Ok(http::Response::new(Value::Array(rows).to_string()).into())
    }
}

fn row(year: i64, state: &str, entity: &str, kind: &str, commitment: &str) -> Value {
    json!({
        "funding_year": year.to_string(),
        "state": state,
        "entity_name": entity,
        "applicant_type": kind,
        "total_commitment": commitment
    })
}

#[tokio::test]
async fn test_collect_summarize_persist_pipeline() {
    let portal = FakePortal {
        years: HashMap::from([
            (
                2023,
                vec![
                    row(2023, "NY", "School A", "Library", "15000"),
                    row(2023, "NY", "School C", "School", "5000"),
                    row(2023, "CA", "School B", "School", "not reported"),
                ],
            ),
            (2024, vec![row(2024, "CA", "School A", "School", "10000")]),
        ]),
    };
    let client = SodaClient::new(portal, Dataset::erate()).with_pause(Duration::ZERO);

    let table = client
        .fetch_years(2023..=2024, &FilterSet::new(), 2)
        .await
        .expect("collection failed");

    assert_eq!(table.len(), 4);

    let stats = summarize(&table, &SummaryRequest::erate());
    assert_eq!(stats.total_records, Some(4));
    assert_eq!(stats.distinct_counts["state"], 2);
    assert_eq!(stats.distinct_counts["entity_name"], 3);
    assert_eq!(stats.values["funding_year"], vec!["2023", "2024"]);
    let numeric = stats.numeric.as_ref().unwrap();
    assert_eq!(numeric.sum, 30000.0);
    assert_eq!(numeric.mean, Some(10000.0));

    let path = std::env::temp_dir()
        .join(format!("erate_prospector_it_{}", std::process::id()))
        .join("erate_data.csv");
    persist(&table, &path).expect("persist failed");

    let reloaded = load_table(&path).expect("load failed");
    assert_eq!(reloaded.columns(), table.columns());
    assert_eq!(summarize(&reloaded, &SummaryRequest::erate()), stats);

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

/// Fake Urban Institute endpoint: `per_page`/`page` windows, `results` envelope.
struct FakeEducationApi {
    schools: Vec<Value>,
}

#[async_trait]
impl HttpClient for FakeEducationApi {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let params: HashMap<String, String> = req.url().query_pairs().into_owned().collect();
        let per_page: usize = params["per_page"].parse().unwrap();
        let page: usize = params["page"].parse().unwrap();

        let results: Vec<Value> = self
            .schools
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();
        let body = json!({"count": self.schools.len(), "results": results});
        Ok(http::Response::new(body.to_string()).into())
    }
}

#[tokio::test]
async fn test_schools_collect_feeds_poverty_rate() {
    let school = |state: &str, enrollment: i64, certified: i64| {
        json!({
            "ncessch": format!("{state}{enrollment}"),
            "state_location": state,
            "enrollment": enrollment,
            "direct_certification": certified
        })
    };
    let api = FakeEducationApi {
        schools: vec![
            school("AL", 400, 100),
            school("AL", 300, 60),
            school("CA", 300, 40),
        ],
    };
    let client = SodaClient::new(api, Dataset::schools()).with_pause(Duration::ZERO);

    let table = client
        .fetch_all(&[FilterSet::new()], 2)
        .await
        .expect("collection failed");
    assert_eq!(table.len(), 3);

    let stats = summarize(&table, &SummaryRequest::schools());
    assert_eq!(stats.distinct_counts["state_location"], 2);
    assert_eq!(stats.numeric.as_ref().unwrap().sum, 1000.0);

    let path = std::env::temp_dir()
        .join(format!("erate_prospector_schools_{}", std::process::id()))
        .join("nces_schools.csv");
    persist(&table, &path).expect("persist failed");

    let reloaded = load_table(&path).expect("load failed");
    assert_eq!(poverty_rate(&reloaded), 20.0);

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}
