use hopmap::handlers::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_parse_address_line_ipv4() {
    let result = parse_address_line("93.184.216.34");
    assert_eq!(result.map(|r| r.address), Some("93.184.216.34".to_string()));
}

#[test]
fn test_parse_address_line_full_ipv6() {
    let result = parse_address_line("2001:db8:0:0:0:0:0:1");
    assert_eq!(
        result.map(|r| r.address),
        Some("2001:db8:0:0:0:0:0:1".to_string())
    );
}

#[test]
fn test_parse_address_line_takes_first_token() {
    let result = parse_address_line("hop 10.0.0.1 via 10.0.0.2");
    assert_eq!(result.map(|r| r.address), Some("10.0.0.1".to_string()));
}

#[test]
fn test_parse_address_line_invalid() {
    let result = parse_address_line("not an address!!!");
    assert!(result.is_none());
}

#[test]
fn test_parse_address_line_empty() {
    assert!(parse_address_line("   ").is_none());
}

#[test]
fn test_load_addresses_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "93.184.216.34")?;
    writeln!(temp_file, "no address on this line")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "10.0.0.1")?;

    let path = PathBuf::from(temp_file.path());
    let records = load_addresses_from_file(&path)?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].address, "93.184.216.34");
    assert_eq!(records[1].address, "10.0.0.1");

    Ok(())
}

#[test]
fn test_load_addresses_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_addresses_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid addresses"));
}

#[test]
fn test_load_addresses_from_source_positional() {
    let addresses = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
    let records = load_addresses_from_source(&addresses, None).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].address, "10.0.0.1");
}

#[test]
fn test_load_addresses_from_source_no_input() {
    let result = load_addresses_from_source(&[], None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either addresses or --addresses-file must be provided")
    );
}

#[test]
fn test_load_addresses_from_source_all_invalid() {
    let addresses = vec!["nope".to_string()];
    let result = load_addresses_from_source(&addresses, None);
    assert!(result.is_err());
}

#[test]
fn test_load_document_missing_file() {
    let path = PathBuf::from("/nonexistent/hops.html");
    let result = load_document(&path);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to read input"));
}

#[test]
fn test_load_document_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    write!(temp_file, "<table id=\"table\"></table>")?;

    let path = PathBuf::from(temp_file.path());
    let html = load_document(&path)?;

    assert!(html.contains("table"));
    Ok(())
}

#[test]
fn test_generate_text_report() {
    use hopmap_resolver::Location;

    let report = RouteReport::new(
        3,
        vec![
            Location {
                latitude: 37.7749,
                longitude: -122.4194,
                ip: "123.123.123.123".to_string(),
            },
            Location {
                latitude: 34.0522,
                longitude: -118.2437,
                ip: "124.124.124.124".to_string(),
            },
        ],
    );

    let listing = generate_text_report(&report);

    assert!(listing.contains("Addresses discovered: 3"));
    assert!(listing.contains("Addresses resolved:   2"));
    assert!(listing.contains("[1] 123.123.123.123"));
    assert!(listing.contains("[2] 124.124.124.124"));
}
