use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::geocoder::{GeocodeError, Geocoder};
use crate::domain::post::GeoPoint;

#[derive(Debug, Deserialize)]
struct ReverseResponseDto {
    address: Option<AddressDto>,
}

#[derive(Debug, Deserialize)]
struct AddressDto {
    city: Option<String>,
    town: Option<String>,
    suburb: Option<String>,
}

/// Обратный геокодер поверх Nominatim-совместимого `/reverse`.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/reverse", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, point: GeoPoint) -> Result<String, GeocodeError> {
        let params = [
            ("format", "json".to_string()),
            ("lat", point.lat.to_string()),
            ("lon", point.lng.to_string()),
        ];
        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;
        let name = parse_place_name(&body)?;
        debug!(lat = point.lat, lng = point.lng, name = %name, "reverse geocoded");
        Ok(name)
    }
}

/// Название места из ответа: город, иначе посёлок, иначе район.
fn parse_place_name(body: &str) -> Result<String, GeocodeError> {
    let dto: ReverseResponseDto =
        serde_json::from_str(body).map_err(|err| GeocodeError::Decode(err.to_string()))?;
    let address = dto.address.ok_or(GeocodeError::NoPlaceName)?;

    [address.city, address.town, address.suburb]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .ok_or(GeocodeError::NoPlaceName)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{NominatimGeocoder, parse_place_name};
    use crate::data::geocoder::GeocodeError;

    #[test]
    fn prefers_city_over_town_and_suburb() {
        let body = r#"{"address":{"city":"Naha","town":"Tomigusuku","suburb":"Shuri"}}"#;
        assert_eq!(parse_place_name(body).expect("must parse"), "Naha");
    }

    #[test]
    fn falls_back_to_town_then_suburb() {
        let town = r#"{"address":{"town":"Motobu","suburb":"Toguchi"}}"#;
        assert_eq!(parse_place_name(town).expect("must parse"), "Motobu");

        let suburb = r#"{"address":{"city":"  ","suburb":"Shuri"}}"#;
        assert_eq!(parse_place_name(suburb).expect("must parse"), "Shuri");
    }

    #[test]
    fn missing_address_is_no_place_name() {
        let err = parse_place_name(r#"{"error":"Unable to geocode"}"#).expect_err("must fail");
        assert!(matches!(err, GeocodeError::NoPlaceName));

        let err = parse_place_name(r#"{"address":{"country":"Japan"}}"#).expect_err("must fail");
        assert!(matches!(err, GeocodeError::NoPlaceName));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = parse_place_name("<html>").expect_err("must fail");
        assert!(matches!(err, GeocodeError::Decode(_)));
    }

    #[test]
    fn endpoint_joins_reverse_path() {
        let geocoder = NominatimGeocoder::new(
            "https://nominatim.example.org/",
            "pilgrim-tests",
            Duration::from_secs(1),
        )
        .expect("client must build");
        assert_eq!(geocoder.endpoint(), "https://nominatim.example.org/reverse");
    }
}
