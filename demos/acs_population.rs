use anyhow::Result;
use censusapi::{Client, CredentialResolver, Dataset, GeoLevel, Query, acs};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Put CENSUS_KEY=... in a `.env` file, or run keyless.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut query = Query::for_dataset(2005, Dataset::Acs1);
    query
        .set_variables([acs::POPULATION, acs::MEDIAN_EARNINGS])
        .set_geography(GeoLevel::Msa.all());
    if let Some(warning) = query.load_credentials(&CredentialResolver::new(), None, false) {
        eprintln!("continuing without an API key: {}", warning);
    }

    let table = Client::new()?.execute(&query)?;

    println!("{} metro areas", table.len());
    for row in table.rows().take(10) {
        println!(
            "{:<60} {:>12} {:>10}",
            row.get("NAME").unwrap_or_default(),
            row.get(acs::POPULATION.code).unwrap_or_default(),
            row.get(acs::MEDIAN_EARNINGS.code).unwrap_or_default(),
        );
    }
    Ok(())
}
