//! Fare computation. Costs stay fractional until [`display_cost`].

use serde::Serialize;

use crate::models::route::{
    ROUTES, Route, RouteSelection, RouteType, SPECIAL_ZONES, SpecialZoneSelection,
};
use crate::models::surcharge::{
    ADULT_PASSENGER_COST, CHILD_PASSENGER_COST, ERRAND_PICKUP_COST, ERRAND_PURCHASE_COST,
    PET_CAGED_COST, PET_UNCAGED_COST, Surcharges,
};
use crate::models::trip::{QUICK_STOP_COST, SERVICE_STOP_COST};

pub const BASE_FARE: f64 = 50.0;
pub const WAITING_RATE_PER_MINUTE: f64 = 3.0;
pub const SPECIAL_ZONE_PRICE: f64 = 70.0;

pub const CROSSING_SURCHARGE: f64 = 5.0;
pub const CROSSING_THRESHOLD_KM: f64 = 3.7;

/// Flat-price routes include this many km before the per-km extra applies.
pub const FLAT_ROUTE_INCLUDED_KM: f64 = 5.0;
pub const FLAT_ROUTE_EXTRA_PER_KM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DistanceBand {
    Flat {
        min_km: f64,
        max_km: f64,
        price: f64,
    },
    Open {
        min_km: f64,
        base_price: f64,
        extra_per_km: f64,
    },
}

impl DistanceBand {
    fn contains(&self, distance_km: f64) -> bool {
        match *self {
            DistanceBand::Flat { min_km, max_km, .. } => {
                distance_km >= min_km && distance_km <= max_km
            }
            DistanceBand::Open { min_km, .. } => distance_km >= min_km,
        }
    }

    fn price(&self, distance_km: f64, base: f64) -> f64 {
        match *self {
            DistanceBand::Flat { price, .. } => base + (price - BASE_FARE),
            DistanceBand::Open {
                min_km,
                base_price,
                extra_per_km,
            } => (base_price - BASE_FARE + base) + (distance_km - min_km) * extra_per_km,
        }
    }
}

/// Standard route price table, ascending.
pub static DISTANCE_BANDS: [DistanceBand; 6] = [
    DistanceBand::Flat {
        min_km: 0.0,
        max_km: 3.99,
        price: 50.0,
    },
    DistanceBand::Flat {
        min_km: 4.0,
        max_km: 4.99,
        price: 55.0,
    },
    DistanceBand::Flat {
        min_km: 5.0,
        max_km: 5.99,
        price: 60.0,
    },
    DistanceBand::Flat {
        min_km: 6.0,
        max_km: 6.99,
        price: 65.0,
    },
    DistanceBand::Flat {
        min_km: 7.0,
        max_km: 7.99,
        price: 70.0,
    },
    DistanceBand::Open {
        min_km: 8.0,
        base_price: 80.0,
        extra_per_km: 16.0,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct FareInput<'a> {
    pub distance_km: f64,
    pub waiting_minutes: u64,
    pub route: &'a RouteSelection,
    pub special_zone: &'a SpecialZoneSelection,
    pub surcharges: &'a Surcharges,
    pub stop_cost: f64,
}

/// Itemised fare. `total` is the sum of the other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FareBreakdown {
    pub stops: f64,
    pub route_fare: f64,
    pub waiting: f64,
    pub surcharges: f64,
    pub crossing: f64,
    pub total: f64,
}

impl FareBreakdown {
    fn new(stops: f64, route_fare: f64, waiting: f64, surcharges: f64, crossing: f64) -> Self {
        Self {
            stops,
            route_fare,
            waiting,
            surcharges,
            crossing,
            total: stops + route_fare + waiting + surcharges + crossing,
        }
    }
}

pub fn fare(input: &FareInput<'_>) -> f64 {
    fare_breakdown(input).total
}

pub fn fare_breakdown(input: &FareInput<'_>) -> FareBreakdown {
    let distance_km = input.distance_km.max(0.0);
    let waiting = waiting_charge(input.waiting_minutes);
    let surcharges = input.surcharges.total();
    let route = input.route.route;

    if input.special_zone.is_confirmed() {
        return FareBreakdown::new(input.stop_cost, SPECIAL_ZONE_PRICE, waiting, surcharges, 0.0);
    }

    if let RouteType::ThresholdSurcharge {
        base_price,
        threshold_km,
        per_km,
    } = route.kind
    {
        let mut route_fare = base_price;
        if distance_km > threshold_km {
            route_fare += (distance_km - threshold_km).ceil() * per_km;
        }
        return FareBreakdown::new(input.stop_cost, route_fare, waiting, surcharges, 0.0);
    }

    let base = base_fare(input.route);
    let route_fare = if route.is_standard() {
        standard_fare(distance_km, base)
    } else if distance_km > FLAT_ROUTE_INCLUDED_KM {
        base + (distance_km - FLAT_ROUTE_INCLUDED_KM) * FLAT_ROUTE_EXTRA_PER_KM
    } else {
        base
    };

    let crossing_applies = (!route.is_standard() || input.special_zone.is_pending())
        && distance_km >= CROSSING_THRESHOLD_KM;
    let crossing = if crossing_applies {
        CROSSING_SURCHARGE
    } else {
        0.0
    };

    FareBreakdown::new(input.stop_cost, route_fare, waiting, surcharges, crossing)
}

/// Sub-route price, then the route's own price, then [`BASE_FARE`].
pub fn base_fare(selection: &RouteSelection) -> f64 {
    if let Some(sub_route) = selection.sub_route {
        if matches!(selection.route.kind, RouteType::MultiLeg { .. }) {
            return sub_route.fixed_price;
        }
    }
    selection.route.fixed_price().unwrap_or(BASE_FARE)
}

pub fn waiting_charge(waiting_minutes: u64) -> f64 {
    waiting_minutes as f64 * WAITING_RATE_PER_MINUTE
}

/// Whole currency units shown to the passenger.
pub fn display_cost(cost: f64) -> u64 {
    cost.max(0.0).ceil() as u64
}

fn standard_fare(distance_km: f64, base: f64) -> f64 {
    DISTANCE_BANDS
        .iter()
        .find(|band| band.contains(distance_km))
        .map(|band| band.price(distance_km, base))
        .unwrap_or(base)
}

/// Read-only price list for the display layer.
#[derive(Debug, Clone, Serialize)]
pub struct TariffCatalog {
    pub base_fare: f64,
    pub waiting_rate_per_minute: f64,
    pub distance_bands: &'static [DistanceBand],
    pub crossing_surcharge: f64,
    pub crossing_threshold_km: f64,
    pub quick_stop: f64,
    pub service_stop: f64,
    pub pet_caged: f64,
    pub pet_uncaged: f64,
    pub errand_pickup: f64,
    pub errand_purchase: f64,
    pub adult_passenger: f64,
    pub child_passenger: f64,
    pub special_zone_price: f64,
    pub special_zones: &'static [&'static str],
    pub routes: &'static [Route],
}

pub fn catalog() -> TariffCatalog {
    TariffCatalog {
        base_fare: BASE_FARE,
        waiting_rate_per_minute: WAITING_RATE_PER_MINUTE,
        distance_bands: &DISTANCE_BANDS,
        crossing_surcharge: CROSSING_SURCHARGE,
        crossing_threshold_km: CROSSING_THRESHOLD_KM,
        quick_stop: QUICK_STOP_COST,
        service_stop: SERVICE_STOP_COST,
        pet_caged: PET_CAGED_COST,
        pet_uncaged: PET_UNCAGED_COST,
        errand_pickup: ERRAND_PICKUP_COST,
        errand_purchase: ERRAND_PURCHASE_COST,
        adult_passenger: ADULT_PASSENGER_COST,
        child_passenger: CHILD_PASSENGER_COST,
        special_zone_price: SPECIAL_ZONE_PRICE,
        special_zones: &SPECIAL_ZONES,
        routes: &ROUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::{find_route, find_zone};
    use crate::models::surcharge::{ErrandKind, ErrandSurcharge, PassengerSurcharge, PetSurcharge};

    struct Case {
        route: RouteSelection,
        zone: SpecialZoneSelection,
        surcharges: Surcharges,
        stop_cost: f64,
    }

    impl Case {
        fn route(id: &str) -> Self {
            Self {
                route: RouteSelection::new(find_route(id).unwrap()),
                zone: SpecialZoneSelection::default(),
                surcharges: Surcharges::default(),
                stop_cost: 0.0,
            }
        }

        fn fare(&self, distance_km: f64, waiting_minutes: u64) -> f64 {
            self.breakdown(distance_km, waiting_minutes).total
        }

        fn breakdown(&self, distance_km: f64, waiting_minutes: u64) -> FareBreakdown {
            fare_breakdown(&FareInput {
                distance_km,
                waiting_minutes,
                route: &self.route,
                special_zone: &self.zone,
                surcharges: &self.surcharges,
                stop_cost: self.stop_cost,
            })
        }
    }

    #[test]
    fn standard_route_uses_matching_band() {
        let case = Case::route("normal");
        assert_eq!(case.fare(0.0, 0), 50.0);
        assert_eq!(case.fare(4.5, 0), 55.0);
        assert_eq!(case.fare(5.99, 0), 60.0);
        assert_eq!(case.fare(7.2, 0), 70.0);
    }

    #[test]
    fn standard_route_top_band_charges_per_km() {
        let case = Case::route("normal");
        assert_eq!(case.fare(8.0, 0), 80.0);
        assert_eq!(case.fare(9.0, 0), 96.0);
    }

    #[test]
    fn distance_between_bands_keeps_base_fare() {
        let case = Case::route("normal");
        assert_eq!(case.fare(3.995, 0), BASE_FARE);
    }

    #[test]
    fn standard_route_never_pays_crossing() {
        let case = Case::route("normal");
        assert_eq!(case.breakdown(6.5, 0).crossing, 0.0);
    }

    #[test]
    fn threshold_route_charges_per_started_km() {
        let case = Case::route("colmena");
        assert_eq!(case.fare(4.9, 0), 120.0);
        assert_eq!(case.fare(6.0, 0), 140.0);
        assert_eq!(case.fare(5.0, 0), 130.0);
        assert_eq!(case.breakdown(6.0, 0).crossing, 0.0);
    }

    #[test]
    fn fixed_destination_adds_extra_beyond_five_km() {
        let case = Case::route("walmart");
        assert_eq!(case.fare(2.0, 0), 60.0);
        // 60 + crossing 5
        assert_eq!(case.fare(4.0, 0), 65.0);
        // 60 + 1.5 * 10 + crossing 5
        assert_eq!(case.fare(6.5, 0), 80.0);
    }

    #[test]
    fn multi_leg_without_leg_falls_back_to_base_fare() {
        let case = Case::route("cristo-rey");
        assert_eq!(case.fare(1.0, 0), BASE_FARE);
    }

    #[test]
    fn multi_leg_uses_selected_leg_price() {
        let route = find_route("cristo-rey").unwrap();
        let mut case = Case::route("cristo-rey");
        case.route = RouteSelection::with_sub_route(route, route.sub_route("cristo-rey-arriba").unwrap());

        assert_eq!(case.fare(1.0, 0), 80.0);
        assert_eq!(case.fare(3.7, 0), 85.0);
    }

    #[test]
    fn confirmed_special_zone_ignores_distance_and_route() {
        let mut case = Case::route("colmena");
        case.zone = SpecialZoneSelection {
            active: true,
            zone: find_zone("Las Garzas"),
        };
        case.stop_cost = 40.0;

        assert_eq!(case.fare(12.0, 10), 140.0);
        assert_eq!(case.fare(0.5, 10), 140.0);
    }

    #[test]
    fn pending_special_zone_adds_crossing_on_standard_route() {
        let mut case = Case::route("normal");
        case.zone = SpecialZoneSelection {
            active: true,
            zone: None,
        };

        assert_eq!(case.fare(3.0, 0), 50.0);
        assert_eq!(case.fare(4.5, 0), 60.0);
    }

    #[test]
    fn waiting_charge_uses_whole_minutes() {
        let case = Case::route("normal");
        assert_eq!(waiting_charge(0), 0.0);
        assert_eq!(case.fare(1.0, 4), 62.0);
    }

    #[test]
    fn surcharges_and_stops_are_additive() {
        let mut case = Case::route("normal");
        case.surcharges = Surcharges {
            pet: PetSurcharge::select(true),
            errand: ErrandSurcharge::select(ErrandKind::Pickup),
            passengers: PassengerSurcharge::with_counts(1, 2),
        };
        case.stop_cost = 70.0;

        let breakdown = case.breakdown(4.5, 1);
        assert_eq!(breakdown.surcharges, 20.0 + 60.0 + 40.0);
        assert_eq!(breakdown.total, 70.0 + 55.0 + 3.0 + 120.0);
    }

    #[test]
    fn breakdown_items_sum_to_total() {
        let mut case = Case::route("tecnologico");
        case.surcharges.pet = PetSurcharge::select(false);
        case.stop_cost = 20.0;

        let b = case.breakdown(7.3, 3);
        assert_eq!(b.total, b.stops + b.route_fare + b.waiting + b.surcharges + b.crossing);
    }

    #[test]
    fn fare_is_idempotent() {
        let case = Case::route("walmart");
        let first = case.fare(6.123456789, 7);
        let second = case.fare(6.123456789, 7);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn display_cost_rounds_up() {
        assert_eq!(display_cost(55.0), 55);
        assert_eq!(display_cost(55.01), 56);
        assert_eq!(display_cost(-1.0), 0);
    }
}
