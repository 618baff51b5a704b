use std::net::IpAddr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::ClassifyError;
use crate::settings::GeoSettings;

/// Maps an IP address to a country code string.
pub trait GeoLookup {
    fn lookup(&self, ip: IpAddr) -> Result<String, ClassifyError>;
}

/// Geolocation over HTTP against an ip2location-style service.
///
/// Expects a JSON object with the country code under `country_field`.
pub struct HttpGeoLookup {
    client: Client,
    url_template: String,
    country_field: String,
}

impl HttpGeoLookup {
    pub fn new(settings: &GeoSettings) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClassifyError::Http(e.to_string()))?;

        Ok(HttpGeoLookup {
            client,
            url_template: settings.lookup_url.clone(),
            country_field: settings.country_field.clone(),
        })
    }

    fn url_for(&self, ip: IpAddr) -> String {
        self.url_template.replace("{ip}", &ip.to_string())
    }
}

impl GeoLookup for HttpGeoLookup {
    fn lookup(&self, ip: IpAddr) -> Result<String, ClassifyError> {
        let response = self.client.get(self.url_for(ip)).send().map_err(|e| {
            if e.is_timeout() {
                ClassifyError::Timeout(ip.to_string())
            } else {
                ClassifyError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .map_err(|e| ClassifyError::Body(e.to_string()))?;
        country_from_body(&body, &self.country_field)
    }
}

/// Pulls the country field out of a lookup response body.
pub fn country_from_body(body: &Value, field: &str) -> Result<String, ClassifyError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClassifyError::Body(format!("missing string field `{}`", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_country_from_body() {
        assert_eq!(
            country_from_body(&json!({"country_code": "JP"}), "country_code").unwrap(),
            "JP"
        );
        assert!(country_from_body(&json!({"country": "JP"}), "country_code").is_err());
        assert!(country_from_body(&json!({"country_code": 1}), "country_code").is_err());
        assert!(country_from_body(&json!([]), "country_code").is_err());
    }

    #[test]
    fn test_url_for() {
        let geo = HttpGeoLookup::new(&GeoSettings::default()).unwrap();
        assert_eq!(
            geo.url_for("1.2.3.4".parse().unwrap()),
            "http://ip2location.default/info?ip=1.2.3.4"
        );
    }
}
