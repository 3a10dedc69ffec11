use serde::Serialize;

/// A named leg of a [`RouteType::MultiLeg`] route with its own flat price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubRoute {
    pub id: &'static str,
    pub name: &'static str,
    pub fixed_price: f64,
}

/// Pricing shape of a route. Matched by the tariff engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RouteType {
    /// Priced by the distance band table.
    Standard,
    /// Flat price to a known destination.
    FixedDestination { fixed_price: f64, distance_km: f64 },
    /// Flat price depends on which sub-route is chosen.
    MultiLeg { sub_routes: &'static [SubRoute] },
    /// Flat base plus a charge per started km beyond `threshold_km`.
    ThresholdSurcharge {
        base_price: f64,
        threshold_km: f64,
        per_km: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub kind: RouteType,
}

impl Route {
    /// The route's own flat price, if it has one.
    pub fn fixed_price(&self) -> Option<f64> {
        match self.kind {
            RouteType::FixedDestination { fixed_price, .. } => Some(fixed_price),
            RouteType::ThresholdSurcharge { base_price, .. } => Some(base_price),
            RouteType::Standard | RouteType::MultiLeg { .. } => None,
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self.kind, RouteType::Standard)
    }

    pub fn sub_routes(&self) -> &'static [SubRoute] {
        match self.kind {
            RouteType::MultiLeg { sub_routes } => sub_routes,
            _ => &[],
        }
    }

    pub fn sub_route(&self, id: &str) -> Option<&'static SubRoute> {
        self.sub_routes().iter().find(|sub_route| sub_route.id == id)
    }
}

static CRISTO_REY_LEGS: [SubRoute; 3] = [
    SubRoute {
        id: "cristo-rey-cano",
        name: "Camino al Caño",
        fixed_price: 60.0,
    },
    SubRoute {
        id: "cristo-rey-mitad",
        name: "Mitad del Sendero",
        fixed_price: 70.0,
    },
    SubRoute {
        id: "cristo-rey-arriba",
        name: "Cima de la Ofrenda",
        fixed_price: 80.0,
    },
];

/// Route catalog. The first entry is the default route.
pub static ROUTES: [Route; 5] = [
    Route {
        id: "normal",
        name: "Viaje Altar Mayor",
        description: "Tarifa por distancia recorrida",
        kind: RouteType::Standard,
    },
    Route {
        id: "walmart",
        name: "Al Mictlán Express",
        description: "Ofrenda Central → Walmart Guzmán",
        kind: RouteType::FixedDestination {
            fixed_price: 60.0,
            distance_km: 5.2,
        },
    },
    Route {
        id: "tecnologico",
        name: "Al Inframundo Tec",
        description: "Ofrenda Central → Tec. Guzmán",
        kind: RouteType::FixedDestination {
            fixed_price: 70.0,
            distance_km: 5.9,
        },
    },
    Route {
        id: "cristo-rey",
        name: "Al Cerro de las Calaveras",
        description: "Ofrenda Central → Cerro Cristo Rey",
        kind: RouteType::MultiLeg {
            sub_routes: &CRISTO_REY_LEGS,
        },
    },
    Route {
        id: "colmena",
        name: "La Colmena del Inframundo",
        description: "Precio base $120, +$10/km después de 4.9 km",
        kind: RouteType::ThresholdSurcharge {
            base_price: 120.0,
            threshold_km: 4.9,
            per_km: 10.0,
        },
    },
];

pub fn default_route() -> &'static Route {
    &ROUTES[0]
}

pub fn find_route(id: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.id == id)
}

/// The chosen route and, for multi-leg routes, the chosen leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSelection {
    pub route: &'static Route,
    pub sub_route: Option<&'static SubRoute>,
}

impl Default for RouteSelection {
    fn default() -> Self {
        Self {
            route: default_route(),
            sub_route: None,
        }
    }
}

impl RouteSelection {
    pub fn new(route: &'static Route) -> Self {
        Self {
            route,
            sub_route: None,
        }
    }

    pub fn with_sub_route(route: &'static Route, sub_route: &'static SubRoute) -> Self {
        Self {
            route,
            sub_route: Some(sub_route),
        }
    }
}

/// Fixed-price zones, alphabetical.
pub static SPECIAL_ZONES: [&str; 7] = [
    "Américas",
    "Col. San José",
    "Emiliano Zapata",
    "Las Garzas",
    "Las Lomas",
    "Pueblos de Jalisco",
    "Valle de Zapotlan",
];

pub fn find_zone(name: &str) -> Option<&'static str> {
    SPECIAL_ZONES.iter().copied().find(|zone| *zone == name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecialZoneSelection {
    pub active: bool,
    pub zone: Option<&'static str>,
}

impl SpecialZoneSelection {
    /// Active with a concrete zone: the fare collapses to the zone price.
    pub fn is_confirmed(&self) -> bool {
        self.active && self.zone.is_some()
    }

    /// Active but still waiting for a zone choice.
    pub fn is_pending(&self) -> bool {
        self.active && self.zone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_is_standard() {
        assert!(default_route().is_standard());
        assert_eq!(default_route().id, "normal");
    }

    #[test]
    fn zones_are_sorted() {
        let mut sorted = SPECIAL_ZONES;
        sorted.sort();
        assert_eq!(sorted, SPECIAL_ZONES);
    }

    #[test]
    fn sub_routes_only_resolve_on_their_parent() {
        let cristo_rey = find_route("cristo-rey").unwrap();
        let walmart = find_route("walmart").unwrap();

        assert_eq!(
            cristo_rey.sub_route("cristo-rey-mitad").map(|leg| leg.fixed_price),
            Some(70.0)
        );
        assert!(walmart.sub_route("cristo-rey-mitad").is_none());
        assert!(cristo_rey.fixed_price().is_none());
    }

    #[test]
    fn unknown_catalog_ids_are_none() {
        assert!(find_route("mictlan").is_none());
        assert!(find_zone("Centro").is_none());
        assert_eq!(find_zone("Las Lomas"), Some("Las Lomas"));
    }
}
