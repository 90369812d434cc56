// # Customer service page parsing
//
// The STRATO customer service is a server-rendered web application. These
// helpers pull the pieces we need out of its HTML and build the form bodies
// we post back. They are pure functions so they can be tested against
// fixture markup without a network.

use dnsrec_core::{Configuration, Error, Record, Result};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// Submit button name of the TXT/CNAME settings form
pub(crate) const CHANGE_RECORDS_ACTION: &str = "action_change_txt_records";

/// Submit button label the server expects for the change action
const CHANGE_RECORDS_LABEL: &str = "Einstellung übernehmen";

/// Node of the domain management pages
pub(crate) const MANAGE_DOMAINS_NODE: &str = "ManageDomains";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::parse(format!("invalid selector '{}': {}", css, e)))
}

/// Look up a query parameter in a URL
pub(crate) fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Result of inspecting the page served after a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoginPage {
    /// Logged in; the page carries a session id
    Session(String),
    /// The account requires a second factor
    SecondFactor,
    /// The login form was served again
    Rejected,
}

/// Inspect the page returned by the login POST
pub(crate) fn parse_login_page(html: &str) -> Result<LoginPage> {
    let document = Html::parse_document(html);

    let session_input = selector(r#"input[name="sessionID"]"#)?;
    if let Some(session_id) = document
        .select(&session_input)
        .filter_map(|input| input.value().attr("value"))
        .find(|value| !value.is_empty())
    {
        return Ok(LoginPage::Session(session_id.to_string()));
    }

    let totp_input = selector(r#"input[name="totp_token"]"#)?;
    if document.select(&totp_input).next().is_some() {
        return Ok(LoginPage::SecondFactor);
    }

    Ok(LoginPage::Rejected)
}

/// Find the package id (`cID`) of the product with the given order number
///
/// The customer entry page lists one product box per package. The box whose
/// text mentions the order number links to the package with a `cID`
/// parameter.
pub(crate) fn parse_package_id(html: &str, base: &Url, order: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let product_box = selector(".cep_product")?;
    let link = selector(r#"a[href*="cID="]"#)?;

    for product in document.select(&product_box) {
        let text: String = product.text().collect();
        if !text.split(|c: char| !c.is_ascii_alphanumeric()).any(|word| word == order) {
            continue;
        }

        for anchor in product.select(&link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(url) = base.join(href) else {
                continue;
            };
            if let Some(package_id) = query_param(&url, "cID") {
                return Ok(package_id);
            }
        }
    }

    Err(Error::provider(
        "strato",
        format!("No package found for order number {}", order),
    ))
}

/// Parse the TXT/CNAME settings form into a configuration
pub(crate) fn parse_configuration(html: &str) -> Result<Configuration> {
    let document = Html::parse_document(html);

    let action = selector(&format!(r#"[name="{}"]"#, CHANGE_RECORDS_ACTION))?;
    if document.select(&action).next().is_none() {
        return Err(Error::parse(
            "DNS settings form not found (session expired or domain not in package?)",
        ));
    }

    let dmarc_policy = checked_value(&document, "dmarc_type")?;
    let spf_policy = checked_value(&document, "spf_type")?;

    let type_select = selector(r#"select[name="type"]"#)?;
    let prefix_input = selector(r#"input[name="prefix"]"#)?;
    let value_area = selector(r#"textarea[name="value"]"#)?;

    let kinds = document
        .select(&type_select)
        .map(selected_option)
        .collect::<Result<Vec<_>>>()?;
    let prefixes: Vec<String> = document
        .select(&prefix_input)
        .map(|input| input.value().attr("value").unwrap_or_default().to_string())
        .collect();
    let values: Vec<String> = document
        .select(&value_area)
        .map(|area| area.text().collect::<String>())
        .collect();

    if kinds.len() != prefixes.len() || kinds.len() != values.len() {
        return Err(Error::parse(format!(
            "Record rows do not line up: {} type(s), {} prefix(es), {} value(s)",
            kinds.len(),
            prefixes.len(),
            values.len()
        )));
    }

    let records = kinds
        .into_iter()
        .zip(prefixes)
        .zip(values)
        .map(|((kind, prefix), value)| Record::new(kind, prefix, value.trim()))
        // The form always ends with a blank row for new entries
        .filter(|record| !record.prefix.is_empty() || !record.value.is_empty())
        .collect();

    Ok(Configuration {
        dmarc_policy,
        spf_policy,
        records,
    })
}

/// Value of the checked radio button in a group, empty if none is checked
fn checked_value(document: &Html, name: &str) -> Result<String> {
    let checked = selector(&format!(r#"input[name="{}"][checked]"#, name))?;
    Ok(document
        .select(&checked)
        .next()
        .and_then(|input| input.value().attr("value"))
        .unwrap_or_default()
        .to_string())
}

/// Value of the selected option, or the first option like a browser would
fn selected_option(select: ElementRef<'_>) -> Result<String> {
    let selected = selector("option[selected]")?;
    let any = selector("option")?;

    let option = select
        .select(&selected)
        .next()
        .or_else(|| select.select(&any).next())
        .ok_or_else(|| Error::parse("Record type select has no options"))?;

    Ok(option
        .value()
        .attr("value")
        .map(str::to_string)
        .unwrap_or_else(|| option.text().collect::<String>().trim().to_string()))
}

/// Build the form body that replaces the whole configuration
///
/// Records are sent as repeated `type`/`prefix`/`value` fields in order.
pub(crate) fn replace_form(
    session_id: &str,
    package_id: &str,
    domain: &str,
    config: &Configuration,
) -> Vec<(String, String)> {
    let mut form = vec![
        ("sessionID".to_string(), session_id.to_string()),
        ("cID".to_string(), package_id.to_string()),
        ("node".to_string(), MANAGE_DOMAINS_NODE.to_string()),
        ("vhost".to_string(), domain.to_string()),
        ("dmarc_type".to_string(), config.dmarc_policy.clone()),
        ("spf_type".to_string(), config.spf_policy.clone()),
    ];

    for record in &config.records {
        form.push(("type".to_string(), record.kind.clone()));
        form.push(("prefix".to_string(), record.prefix.clone()));
        form.push(("value".to_string(), record.value.clone()));
    }

    form.push((
        CHANGE_RECORDS_ACTION.to_string(),
        CHANGE_RECORDS_LABEL.to_string(),
    ));
    form
}
