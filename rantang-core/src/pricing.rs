//! Distance and price helpers used when an order is created.

use rantang_sdk::objects::{GeoPoint, OrderItem, OrderType};
use rust_decimal::Decimal;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, rounded to one decimal.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

/// Sum of `price * quantity` over all lines, `None` on overflow.
pub fn items_total(items: &[OrderItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        let line = item.price.checked_mul(Decimal::from(item.quantity()))?;
        total.checked_add(line)
    })
}

/// The total the server would charge: catering lines are multiplied by pax.
///
/// `None` when the amount does not fit in a `Decimal`.
pub fn expected_total(order_type: OrderType, items: &[OrderItem], pax: u32) -> Option<Decimal> {
    let total = items_total(items)?;
    match order_type {
        OrderType::Catering => total.checked_mul(Decimal::from(pax)),
        OrderType::Rantangan | OrderType::BiteEco => Some(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: Option<u32>) -> OrderItem {
        OrderItem {
            id: String::new(),
            name: String::new(),
            price: Decimal::from(price),
            quantity,
        }
    }

    #[test]
    fn test_haversine_jakarta_bandung() {
        let jakarta = GeoPoint {
            lat: -6.2088,
            lng: 106.8456,
        };
        let bandung = GeoPoint {
            lat: -6.9175,
            lng: 107.6191,
        };
        let km = haversine_km(jakarta, bandung);
        assert!((115.0..117.0).contains(&km), "got {km}");
        assert_eq!(haversine_km(jakarta, jakarta), 0.0);
    }

    #[test]
    fn test_expected_total_multiplies_pax_for_catering() {
        let items = [item(10_000, None), item(5_000, Some(2))];
        assert_eq!(items_total(&items), Some(Decimal::from(20_000)));
        assert_eq!(
            expected_total(OrderType::Catering, &items, 3),
            Some(Decimal::from(60_000))
        );
        assert_eq!(
            expected_total(OrderType::Rantangan, &items, 3),
            Some(Decimal::from(20_000))
        );
    }

    #[test]
    fn test_expected_total_overflow_is_none() {
        let huge = OrderItem {
            price: Decimal::MAX,
            ..item(0, Some(2))
        };
        assert_eq!(items_total(std::slice::from_ref(&huge)), None);

        let at_max = OrderItem {
            price: Decimal::MAX,
            ..item(0, None)
        };
        assert_eq!(
            expected_total(OrderType::Rantangan, std::slice::from_ref(&at_max), 2),
            Some(Decimal::MAX)
        );
        assert_eq!(
            expected_total(OrderType::Catering, std::slice::from_ref(&at_max), 2),
            None
        );
    }
}
