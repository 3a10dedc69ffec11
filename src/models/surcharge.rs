use serde::{Deserialize, Serialize};

pub const PET_CAGED_COST: f64 = 20.0;
pub const PET_UNCAGED_COST: f64 = 30.0;
pub const ERRAND_PICKUP_COST: f64 = 60.0;
pub const ERRAND_PURCHASE_COST: f64 = 70.0;
pub const ADULT_PASSENGER_COST: f64 = 20.0;
pub const CHILD_PASSENGER_COST: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrandKind {
    Pickup,
    Purchase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PetSurcharge {
    pub active: bool,
    pub with_cage: Option<bool>,
    pub cost: f64,
}

impl PetSurcharge {
    pub fn select(with_cage: bool) -> Self {
        Self {
            active: true,
            with_cage: Some(with_cage),
            cost: if with_cage {
                PET_CAGED_COST
            } else {
                PET_UNCAGED_COST
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrandSurcharge {
    pub active: bool,
    pub kind: Option<ErrandKind>,
    pub cost: f64,
}

impl ErrandSurcharge {
    pub fn select(kind: ErrandKind) -> Self {
        Self {
            active: true,
            kind: Some(kind),
            cost: match kind {
                ErrandKind::Pickup => ERRAND_PICKUP_COST,
                ErrandKind::Purchase => ERRAND_PURCHASE_COST,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassengerSurcharge {
    pub active: bool,
    pub adults: u32,
    pub children: u32,
    pub cost: f64,
}

impl PassengerSurcharge {
    pub fn with_counts(adults: u32, children: u32) -> Self {
        Self {
            active: adults > 0 || children > 0,
            adults,
            children,
            cost: f64::from(adults) * ADULT_PASSENGER_COST
                + f64::from(children) * CHILD_PASSENGER_COST,
        }
    }
}

/// The three optional surcharges. Any subset may be active.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Surcharges {
    pub pet: PetSurcharge,
    pub errand: ErrandSurcharge,
    pub passengers: PassengerSurcharge,
}

impl Surcharges {
    pub fn total(&self) -> f64 {
        let pet = if self.pet.active { self.pet.cost } else { 0.0 };
        let errand = if self.errand.active {
            self.errand.cost
        } else {
            0.0
        };
        let passengers = if self.passengers.active {
            self.passengers.cost
        } else {
            0.0
        };

        pet + errand + passengers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_surcharges_cost_nothing() {
        assert_eq!(Surcharges::default().total(), 0.0);
    }

    #[test]
    fn active_surcharges_sum_linearly() {
        let surcharges = Surcharges {
            pet: PetSurcharge::select(false),
            errand: ErrandSurcharge::select(ErrandKind::Purchase),
            passengers: PassengerSurcharge::with_counts(2, 1),
        };

        assert_eq!(surcharges.total(), 30.0 + 70.0 + 50.0);
    }

    #[test]
    fn zero_passengers_deactivates() {
        let passengers = PassengerSurcharge::with_counts(0, 0);
        assert!(!passengers.active);
        assert_eq!(passengers.cost, 0.0);
    }
}
