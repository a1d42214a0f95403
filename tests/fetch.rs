mod common;

use std::time::Duration;

use censusapi::{Client, Dataset, Error, Facet, GeoLevel, Query, Validation, acs};
use common::{closed_port, init_logging, serve_once, serve_silence};

const US_POPULATION: &str = r#"[["NAME","B01001_001E","us"],
["United States","288378137","1"]]"#;

fn us_population(base: &str) -> Query {
    let mut q = Query::for_dataset("2005", Dataset::Acs1);
    q.set_base_endpoint(base)
        .set_variables([acs::POPULATION])
        .set_geography(GeoLevel::Us.code(1))
        .set_credentials("k123");
    q
}

#[test]
fn executes_query_and_keeps_geography_columns() {
    init_logging();
    let (base, server) = serve_once(200, "OK", US_POPULATION);

    let table = Client::new().unwrap().execute(&us_population(&base)).unwrap();

    assert_eq!(
        server.join().unwrap(),
        "/data/2005/acs/acs1?get=NAME,B01001_001E&for=us:1&key=k123"
    );
    assert_eq!(table.columns(), ["NAME", "B01001_001E", "us"]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, "NAME"), Some("United States"));
    assert_eq!(table.value(0, "B01001_001E"), Some("288378137"));
}

#[test]
fn declared_execution_drops_geography_echo() {
    init_logging();
    let (base, server) = serve_once(200, "OK", US_POPULATION);

    let table = Client::new()
        .unwrap()
        .execute_declared(&us_population(&base))
        .unwrap();
    server.join().unwrap();

    assert_eq!(table.columns(), ["NAME", "B01001_001E"]);
    let records = table.records();
    let record = &records[0];
    assert_eq!(record.len(), 2);
    assert_eq!(record["B01001_001E"], "288378137");
}

#[test]
fn fetch_and_normalize_uses_url_verbatim() {
    init_logging();
    let (base, server) = serve_once(
        200,
        "OK",
        r#"[["NAME","P001001","state","county","tract","block"],
["Block 1000, Block Group 1, Census Tract 101, Cook County, Illinois","128","17","031","010100","1000"]]"#,
    );
    let url = format!(
        "{}/data/2010/dec/sf1?get=NAME,P001001&for=block:*&in=state:17%20county:031",
        base
    );

    let table = Client::new().unwrap().fetch_and_normalize(&url).unwrap();

    assert_eq!(
        server.join().unwrap(),
        "/data/2010/dec/sf1?get=NAME,P001001&for=block:*&in=state:17%20county:031"
    );
    assert_eq!(
        table.composite_key(&["state", "county", "tract", "block"]).unwrap(),
        vec!["170310101001000"]
    );
    assert_eq!(table.parse_column::<i64>("P001001").unwrap(), vec![Some(128)]);
}

#[test]
fn non_200_status_is_an_http_error() {
    init_logging();
    let (base, server) = serve_once(400, "Bad Request", "error: unknown variable 'B01001_001X'");
    let mut query = us_population(&base);
    query.set_variables(["B01001_001X"]);

    let err = Client::new().unwrap().execute(&query).unwrap_err();
    server.join().unwrap();

    assert_eq!(err.status_code(), Some(400));
    match &err {
        Error::Http { url, message, .. } => {
            assert!(url.ends_with("key=***"));
            assert!(message.contains("unknown variable"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn non_200_with_tabular_body_still_fails() {
    init_logging();
    let (base, server) = serve_once(500, "Internal Server Error", US_POPULATION);

    let result = Client::new().unwrap().execute(&us_population(&base));
    server.join().unwrap();

    assert!(matches!(result, Err(Error::Http { status: 500, .. })));
}

#[test]
fn no_content_is_an_http_error() {
    init_logging();
    let (base, server) = serve_once(204, "No Content", "");

    let err = Client::new()
        .unwrap()
        .execute(&us_population(&base))
        .unwrap_err();
    server.join().unwrap();

    assert_eq!(err.status_code(), Some(204));
}

#[test]
fn non_json_body_is_malformed() {
    init_logging();
    let (base, server) = serve_once(200, "OK", "<html><body>Invalid Key</body></html>");

    let err = Client::new()
        .unwrap()
        .execute(&us_population(&base))
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[test]
fn short_rows_are_malformed() {
    init_logging();
    let (base, server) = serve_once(200, "OK", r#"[["NAME","B01001_001E"],["United States"]]"#);

    let err = Client::new()
        .unwrap()
        .execute(&us_population(&base))
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[test]
fn strict_query_fails_before_the_network() {
    let mut query = Query::new().with_validation(Validation::Strict);
    query.set_base_endpoint(closed_port()).set_year(2005);

    match Client::new().unwrap().execute(&query) {
        Err(Error::Configuration { missing, .. }) => assert_eq!(missing, vec![Facet::Dataset]),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn lenient_query_sends_the_broken_url() {
    init_logging();
    let (base, server) = serve_once(404, "Not Found", "<html><body>Not Found</body></html>");
    let mut query = Query::new();
    query
        .set_base_endpoint(&base)
        .set_dataset(Dataset::Acs1)
        .set_geography(GeoLevel::Us.code(1));
    assert!(matches!(query.build_url(), Err(Error::Configuration { .. })));

    let err = Client::new().unwrap().execute(&query).unwrap_err();

    assert_eq!(server.join().unwrap(), "/data//acs/acs1?get=NAME&for=us:1");
    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn connection_failure_is_a_transport_error() {
    let query = us_population(&closed_port());

    match Client::new().unwrap().execute(&query) {
        Err(Error::Transport { url, .. }) => assert!(!url.contains("k123")),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn timeout_is_honoured() {
    let base = serve_silence(Duration::from_secs(3));
    let client = Client::with_timeout(Duration::from_millis(300)).unwrap();
    assert_eq!(client.timeout(), Duration::from_millis(300));

    let result = client.execute(&us_population(&base));
    assert!(matches!(result, Err(Error::Transport { .. })));
}
