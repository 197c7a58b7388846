use tracing::debug;

use crate::error::DataError;
use crate::problem::{
    costs::CostSchedule,
    network::{Arc, Network},
    node::NodeIdx,
    vehicle::VehicleIdx,
};

use super::{
    constraint::Constraint,
    expr::LinearExpr,
    variable::{VarDomain, VarId, VarKey, VariableRegistry},
    variant::ModelVariant,
};

const KG_PER_TON: f64 = 1_000.0;

/// Assembled mixed-integer program: variable registry, labelled constraint
/// rows, and a minimization objective. Owned by the caller and handed to a
/// solver backend as-is.
#[derive(Debug, Clone)]
pub struct Model {
    variant: ModelVariant,
    variables: VariableRegistry,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl Model {
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective expression, minimized.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn var(&self, key: &VarKey) -> Option<VarId> {
        self.variables.lookup(key)
    }
}

/// Emits the Capacity / Fuel / FuelTolls formulations as one parameterized
/// constraint family over a [`Network`]. The variants only ever add rows;
/// the shared skeleton is built by the same code for all three, so the
/// formulations cannot drift apart.
pub struct ModelBuilder<'a> {
    network: &'a Network,
    costs: &'a CostSchedule,
    variant: ModelVariant,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(network: &'a Network, costs: &'a CostSchedule, variant: ModelVariant) -> Self {
        Self {
            network,
            costs,
            variant,
        }
    }

    pub fn build(self) -> Result<Model, DataError> {
        let network = self.network;
        let variant = self.variant;

        if variant.tracks_fuel() {
            for vehicle in network.fleet().vehicles() {
                if vehicle.tank_capacity() <= 0.0 {
                    return Err(DataError::InvalidTankCapacity {
                        id: vehicle.external_id().to_owned(),
                        tank: vehicle.tank_capacity(),
                    });
                }
            }
        }

        let mut emit = Emitter {
            network,
            costs: self.costs,
            variant,
            variables: VariableRegistry::default(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
            arcs_by_vehicle: network
                .fleet()
                .indices()
                .map(|v| network.admissible_arcs(v).copied().collect())
                .collect(),
        };

        emit.declare_variables();
        emit.client_coverage();
        emit.depot_flow();
        emit.flow_conservation();
        emit.optional_visit_caps();
        emit.load_capacity();
        emit.range_limit();
        emit.subtour_order();
        emit.arc_vehicle_linkage();
        if variant.tracks_fuel() {
            emit.fuel_balance();
        }
        if variant.tracks_weight() {
            emit.weight_tracking();
            emit.toll_charges();
        }
        emit.base_objective();

        debug!(
            ?variant,
            variables = emit.variables.len(),
            constraints = emit.constraints.len(),
            "assembled arc-flow model"
        );

        Ok(Model {
            variant,
            variables: emit.variables,
            constraints: emit.constraints,
            objective: emit.objective,
        })
    }
}

struct Emitter<'a> {
    network: &'a Network,
    costs: &'a CostSchedule,
    variant: ModelVariant,
    variables: VariableRegistry,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    arcs_by_vehicle: Vec<Vec<Arc>>,
}

impl Emitter<'_> {
    fn node_id(&self, node: NodeIdx) -> &str {
        self.network.node(node).external_id()
    }

    fn vehicle_id(&self, vehicle: VehicleIdx) -> &str {
        self.network.vehicle(vehicle).external_id()
    }

    fn arcs(&self, vehicle: VehicleIdx) -> &[Arc] {
        &self.arcs_by_vehicle[vehicle.get()]
    }

    fn var(&self, key: VarKey) -> VarId {
        self.variables
            .lookup(&key)
            .unwrap_or_else(|| panic!("variable not declared: {key:?}"))
    }

    fn declare_variables(&mut self) {
        let network = self.network;
        let order_bound = network.non_depot_count() as f64;

        for vehicle in network.fleet().indices() {
            self.variables
                .add(VarKey::VehicleUsed { vehicle }, VarDomain::Binary);

            for arc in &self.arcs_by_vehicle[vehicle.get()] {
                self.variables.add(
                    VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    },
                    VarDomain::Binary,
                );
            }

            for node in network.node_indices() {
                if node != network.depot() {
                    self.variables.add(
                        VarKey::VisitOrder { vehicle, node },
                        VarDomain::Continuous {
                            lower: 0.0,
                            upper: order_bound,
                        },
                    );
                }
            }

            if self.variant.tracks_fuel() {
                let tank = network.vehicle(vehicle).tank_capacity();
                for node in network.node_indices() {
                    self.variables.add(
                        VarKey::FuelLevel { vehicle, node },
                        VarDomain::Continuous {
                            lower: 0.0,
                            upper: tank,
                        },
                    );
                }
                // Refuel quantities exist only where refueling is possible;
                // clients and the depot get no variable at all.
                for &node in network.stations() {
                    self.variables.add(
                        VarKey::Refuel { vehicle, node },
                        VarDomain::Continuous {
                            lower: 0.0,
                            upper: tank,
                        },
                    );
                }
            }

            if self.variant.tracks_weight() {
                let max_gross = network.vehicle(vehicle).max_gross_weight_kg();
                for node in network.node_indices() {
                    self.variables.add(
                        VarKey::GrossWeight { vehicle, node },
                        VarDomain::Continuous {
                            lower: 0.0,
                            upper: max_gross,
                        },
                    );
                }
                for &node in network.tolls() {
                    self.variables.add(
                        VarKey::TolledWeight { vehicle, node },
                        VarDomain::Continuous {
                            lower: 0.0,
                            upper: max_gross,
                        },
                    );
                }
            }
        }
    }

    /// Every client has exactly one inbound and one outbound used arc,
    /// summed over the whole fleet.
    fn client_coverage(&mut self) {
        for &client in self.network.clients() {
            let mut inbound = LinearExpr::new();
            let mut outbound = LinearExpr::new();
            for vehicle in self.network.fleet().indices() {
                for arc in self.arcs(vehicle) {
                    if arc.to() == client {
                        inbound.add_term(
                            self.var(VarKey::ArcUse {
                                vehicle,
                                from: arc.from(),
                                to: arc.to(),
                            }),
                            1.0,
                        );
                    }
                    if arc.from() == client {
                        outbound.add_term(
                            self.var(VarKey::ArcUse {
                                vehicle,
                                from: arc.from(),
                                to: arc.to(),
                            }),
                            1.0,
                        );
                    }
                }
            }
            let id = self.node_id(client).to_owned();
            self.constraints
                .push(Constraint::eq(format!("client_in[{id}]"), inbound, 1.0));
            self.constraints
                .push(Constraint::eq(format!("client_out[{id}]"), outbound, 1.0));
        }
    }

    /// An activated vehicle leaves the depot exactly once and returns
    /// exactly once; an idle one does neither.
    fn depot_flow(&mut self) {
        let depot = self.network.depot();
        for vehicle in self.network.fleet().indices() {
            let used = self.var(VarKey::VehicleUsed { vehicle });

            let mut departures = LinearExpr::new();
            let mut returns = LinearExpr::new();
            for arc in self.arcs(vehicle) {
                let x = self.var(VarKey::ArcUse {
                    vehicle,
                    from: arc.from(),
                    to: arc.to(),
                });
                if arc.from() == depot {
                    departures.add_term(x, 1.0);
                }
                if arc.to() == depot {
                    returns.add_term(x, 1.0);
                }
            }
            departures.add_term(used, -1.0);
            returns.add_term(used, -1.0);

            let id = self.vehicle_id(vehicle).to_owned();
            self.constraints
                .push(Constraint::eq(format!("depot_out[{id}]"), departures, 0.0));
            self.constraints
                .push(Constraint::eq(format!("depot_in[{id}]"), returns, 0.0));
        }
    }

    /// Whatever enters a non-depot node with a vehicle also leaves with it.
    fn flow_conservation(&mut self) {
        for vehicle in self.network.fleet().indices() {
            for node in self.network.node_indices() {
                if node == self.network.depot() {
                    continue;
                }
                let mut balance = LinearExpr::new();
                for arc in self.arcs(vehicle) {
                    let x = self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    });
                    if arc.to() == node {
                        balance.add_term(x, 1.0);
                    }
                    if arc.from() == node {
                        balance.add_term(x, -1.0);
                    }
                }
                self.constraints.push(Constraint::eq(
                    format!(
                        "flow[{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(node)
                    ),
                    balance,
                    0.0,
                ));
            }
        }
    }

    /// Stations and toll plazas are optional: at most one visit per vehicle,
    /// and only by an activated vehicle.
    fn optional_visit_caps(&mut self) {
        let optional: Vec<NodeIdx> = self
            .network
            .stations()
            .iter()
            .chain(self.network.tolls())
            .copied()
            .collect();

        for vehicle in self.network.fleet().indices() {
            let used = self.var(VarKey::VehicleUsed { vehicle });
            for &node in &optional {
                let mut inbound = LinearExpr::new();
                for arc in self.arcs(vehicle) {
                    if arc.to() == node {
                        inbound.add_term(
                            self.var(VarKey::ArcUse {
                                vehicle,
                                from: arc.from(),
                                to: arc.to(),
                            }),
                            1.0,
                        );
                    }
                }
                inbound.add_term(used, -1.0);
                self.constraints.push(Constraint::le(
                    format!(
                        "visit_cap[{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(node)
                    ),
                    inbound,
                    0.0,
                ));
            }
        }
    }

    /// Total demand assigned to a vehicle stays within its load capacity.
    fn load_capacity(&mut self) {
        for vehicle in self.network.fleet().indices() {
            let mut served = LinearExpr::new();
            for &client in self.network.clients() {
                let demand = self.network.node(client).demand_kg();
                for arc in self.arcs(vehicle) {
                    if arc.to() == client {
                        served.add_term(
                            self.var(VarKey::ArcUse {
                                vehicle,
                                from: arc.from(),
                                to: arc.to(),
                            }),
                            demand,
                        );
                    }
                }
            }
            served.add_term(
                self.var(VarKey::VehicleUsed { vehicle }),
                -self.network.vehicle(vehicle).capacity_kg(),
            );
            self.constraints.push(Constraint::le(
                format!("capacity[{}]", self.vehicle_id(vehicle)),
                served,
                0.0,
            ));
        }
    }

    /// Distance cap per vehicle. Only the Capacity variant emits it; in the
    /// fuel variants the tank, not a nominal range, limits distance.
    fn range_limit(&mut self) {
        if !self.variant.enforces_range() {
            return;
        }
        for vehicle in self.network.fleet().indices() {
            let range = self.network.vehicle(vehicle).range_km();
            if !range.is_finite() {
                continue;
            }
            let mut travelled = LinearExpr::new();
            for arc in self.arcs(vehicle) {
                travelled.add_term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    arc.distance_km(),
                );
            }
            travelled.add_term(self.var(VarKey::VehicleUsed { vehicle }), -range);
            self.constraints.push(Constraint::le(
                format!("range[{}]", self.vehicle_id(vehicle)),
                travelled,
                0.0,
            ));
        }
    }

    /// Miller-Tucker-Zemlin order potentials: a used arc between two
    /// non-depot nodes forces the successor's order strictly higher, which
    /// rules out any cycle that avoids the depot.
    fn subtour_order(&mut self) {
        let n = self.network.non_depot_count() as f64;
        let depot = self.network.depot();

        for vehicle in self.network.fleet().indices() {
            for arc in self.arcs(vehicle).to_vec() {
                if arc.from() == depot || arc.to() == depot {
                    continue;
                }
                let mut expr = LinearExpr::term(
                    self.var(VarKey::VisitOrder {
                        vehicle,
                        node: arc.from(),
                    }),
                    1.0,
                );
                expr.add_term(
                    self.var(VarKey::VisitOrder {
                        vehicle,
                        node: arc.to(),
                    }),
                    -1.0,
                );
                expr.add_term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    n,
                );
                self.constraints.push(Constraint::le(
                    format!(
                        "order[{},{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(arc.from()),
                        self.node_id(arc.to())
                    ),
                    expr,
                    n - 1.0,
                ));
            }
        }
    }

    /// An arc may only be used by an activated vehicle.
    fn arc_vehicle_linkage(&mut self) {
        for vehicle in self.network.fleet().indices() {
            let used = self.var(VarKey::VehicleUsed { vehicle });
            for arc in self.arcs(vehicle).to_vec() {
                let mut expr = LinearExpr::term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    1.0,
                );
                expr.add_term(used, -1.0);
                self.constraints.push(Constraint::le(
                    format!(
                        "link[{},{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(arc.from()),
                        self.node_id(arc.to())
                    ),
                    expr,
                    0.0,
                ));
            }
        }
    }

    /// Tank state threaded along every used arc, the depot-return arc
    /// included; the Big-M is tank + arc consumption, tight per row.
    fn fuel_balance(&mut self) {
        for vehicle in self.network.fleet().indices() {
            let tank = self.network.vehicle(vehicle).tank_capacity();
            let efficiency = self.network.vehicle(vehicle).fuel_efficiency();

            for arc in self.arcs(vehicle).to_vec() {
                let consumption = arc.distance_km() / efficiency;
                // Tight per row: tank + consumption deactivates the balance
                // on an unused arc; a refuel term at the target can add up
                // to another tankful to the gap.
                let mut big_m = tank + consumption;

                let mut expr = LinearExpr::term(
                    self.var(VarKey::FuelLevel {
                        vehicle,
                        node: arc.to(),
                    }),
                    1.0,
                );
                expr.add_term(
                    self.var(VarKey::FuelLevel {
                        vehicle,
                        node: arc.from(),
                    }),
                    -1.0,
                );
                if self.network.node(arc.to()).is_station() {
                    expr.add_term(
                        self.var(VarKey::Refuel {
                            vehicle,
                            node: arc.to(),
                        }),
                        -1.0,
                    );
                    big_m += tank;
                }
                expr.add_term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    -big_m,
                );
                self.constraints.push(Constraint::ge(
                    format!(
                        "fuel_balance[{},{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(arc.from()),
                        self.node_id(arc.to())
                    ),
                    expr,
                    -(consumption + big_m),
                ));
            }
        }
    }

    /// Gross weight starts at empty weight plus everything loaded for the
    /// assigned clients and drops by each delivery, threaded along used arcs
    /// like the fuel state.
    fn weight_tracking(&mut self) {
        for vehicle in self.network.fleet().indices() {
            let empty = self.network.vehicle(vehicle).empty_weight_kg();
            let max_gross = self.network.vehicle(vehicle).max_gross_weight_kg();
            let used = self.var(VarKey::VehicleUsed { vehicle });
            let vehicle_label = self.vehicle_id(vehicle).to_owned();

            let mut departure = LinearExpr::term(
                self.var(VarKey::GrossWeight {
                    vehicle,
                    node: self.network.depot(),
                }),
                1.0,
            );
            departure.add_term(used, -empty);
            for &client in self.network.clients() {
                let demand = self.network.node(client).demand_kg();
                for arc in self.arcs(vehicle).to_vec() {
                    if arc.to() == client {
                        departure.add_term(
                            self.var(VarKey::ArcUse {
                                vehicle,
                                from: arc.from(),
                                to: arc.to(),
                            }),
                            -demand,
                        );
                    }
                }
            }
            self.constraints.push(Constraint::eq(
                format!("weight_start[{vehicle_label}]"),
                departure,
                0.0,
            ));

            for arc in self.arcs(vehicle).to_vec() {
                let delivered = self.network.node(arc.to()).demand_kg();
                let mut expr = LinearExpr::term(
                    self.var(VarKey::GrossWeight {
                        vehicle,
                        node: arc.to(),
                    }),
                    1.0,
                );
                expr.add_term(
                    self.var(VarKey::GrossWeight {
                        vehicle,
                        node: arc.from(),
                    }),
                    -1.0,
                );
                expr.add_term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    -max_gross,
                );
                self.constraints.push(Constraint::ge(
                    format!(
                        "weight_balance[{},{},{}]",
                        vehicle_label,
                        self.node_id(arc.from()),
                        self.node_id(arc.to())
                    ),
                    expr,
                    -(delivered + max_gross),
                ));
            }

            for node in self.network.node_indices() {
                let mut ceiling = LinearExpr::term(
                    self.var(VarKey::GrossWeight { vehicle, node }),
                    1.0,
                );
                ceiling.add_term(used, -max_gross);
                self.constraints.push(Constraint::le(
                    format!("weight_cap[{},{}]", vehicle_label, self.node_id(node)),
                    ceiling,
                    0.0,
                ));

                if let Some(limit) = self.network.node(node).max_weight_kg() {
                    self.constraints.push(Constraint::le(
                        format!("weight_limit[{},{}]", vehicle_label, self.node_id(node)),
                        LinearExpr::term(self.var(VarKey::GrossWeight { vehicle, node }), 1.0),
                        limit,
                    ));
                }
            }
        }
    }

    /// Weight-dependent toll accrual. The tolled-weight variable is pinned
    /// to the gross weight exactly when the plaza is visited, so the charge
    /// BaseRate + tons * RatePerTon depends on the deliveries already made.
    fn toll_charges(&mut self) {
        for vehicle in self.network.fleet().indices() {
            let max_gross = self.network.vehicle(vehicle).max_gross_weight_kg();
            for &toll in self.network.tolls() {
                let (base_rate, rate_per_ton) = self
                    .network
                    .node(toll)
                    .toll_rates()
                    .expect("toll node carries rates");

                let tolled = self.var(VarKey::TolledWeight {
                    vehicle,
                    node: toll,
                });
                let mut expr = LinearExpr::term(tolled, 1.0);
                expr.add_term(self.var(VarKey::GrossWeight { vehicle, node: toll }), -1.0);
                for arc in self.arcs(vehicle).to_vec() {
                    if arc.to() == toll {
                        let x = self.var(VarKey::ArcUse {
                            vehicle,
                            from: arc.from(),
                            to: arc.to(),
                        });
                        expr.add_term(x, -max_gross);
                        // Flat component of the toll, charged per visit.
                        self.objective.add_term(x, base_rate);
                    }
                }
                self.constraints.push(Constraint::ge(
                    format!(
                        "toll_weight[{},{}]",
                        self.vehicle_id(vehicle),
                        self.node_id(toll)
                    ),
                    expr,
                    -max_gross,
                ));

                self.objective.add_term(tolled, rate_per_ton / KG_PER_TON);
            }
        }
    }

    /// Fixed activation, distance, and refuel cost components.
    fn base_objective(&mut self) {
        for vehicle in self.network.fleet().indices() {
            self.objective.add_term(
                self.var(VarKey::VehicleUsed { vehicle }),
                self.costs.fixed_per_vehicle,
            );
            for arc in self.arcs(vehicle).to_vec() {
                self.objective.add_term(
                    self.var(VarKey::ArcUse {
                        vehicle,
                        from: arc.from(),
                        to: arc.to(),
                    }),
                    self.costs.per_km * arc.distance_km(),
                );
            }
            if self.variant.tracks_fuel() {
                for &station in self.network.stations() {
                    let price = self
                        .network
                        .node(station)
                        .fuel_price()
                        .expect("station carries a fuel price");
                    self.objective.add_term(
                        self.var(VarKey::Refuel {
                            vehicle,
                            node: station,
                        }),
                        price,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::variable::VarKey;
    use crate::model::variant::ModelVariant;
    use crate::problem::costs::CostSchedule;
    use crate::test_utils;

    use super::ModelBuilder;

    #[test]
    fn base_variant_declares_the_expected_variables() {
        let network = test_utils::line_network(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
            .build()
            .unwrap();

        // 1 activation + 6 arcs + 2 order potentials for the single vehicle.
        assert_eq!(model.variables().len(), 1 + 6 + 2);
        let vehicle = network.find_vehicle("V001").unwrap();
        assert!(model.var(&VarKey::VehicleUsed { vehicle }).is_some());
        assert!(
            model
                .var(&VarKey::FuelLevel {
                    vehicle,
                    node: network.depot()
                })
                .is_none(),
            "base variant must not track fuel"
        );
    }

    #[test]
    fn range_rows_only_exist_in_the_base_variant() {
        let network = test_utils::fuel_line_network();
        let costs = CostSchedule::default();

        let base = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
            .build()
            .unwrap();
        let fuel = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
            .build()
            .unwrap();

        assert!(base.constraints().iter().any(|c| c.label().starts_with("range[")));
        assert!(!fuel.constraints().iter().any(|c| c.label().starts_with("range[")));
    }

    #[test]
    fn refuel_variables_exist_only_at_stations() {
        let network = test_utils::fuel_line_network();
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
            .build()
            .unwrap();

        let vehicle = network.find_vehicle("V001").unwrap();
        let station = network.find_node("E001").unwrap();
        let client = network.find_node("C001").unwrap();

        assert!(model.var(&VarKey::Refuel { vehicle, node: station }).is_some());
        assert!(model.var(&VarKey::Refuel { vehicle, node: client }).is_none());
        assert!(
            model
                .var(&VarKey::Refuel {
                    vehicle,
                    node: network.depot()
                })
                .is_none()
        );
    }

    #[test]
    fn fuel_balance_covers_depot_return_arcs() {
        let network = test_utils::fuel_line_network();
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
            .build()
            .unwrap();

        // One balance row per admissible arc, uniformly; the returns to the
        // depot are not exempt.
        let balance_rows = model
            .constraints()
            .iter()
            .filter(|c| c.label().starts_with("fuel_balance["))
            .count();
        let vehicle = network.find_vehicle("V001").unwrap();
        assert_eq!(balance_rows, network.admissible_arcs(vehicle).count());
        assert!(
            model
                .constraints()
                .iter()
                .any(|c| c.label() == "fuel_balance[V001,C001,CD01]")
        );
    }

    #[test]
    fn fuel_variant_requires_a_tank() {
        let network = test_utils::line_network(&[("C001", 10.0, 5.0)]);
        let costs = CostSchedule::default();

        let err = ModelBuilder::new(&network, &costs, ModelVariant::Fuel).build();
        assert!(matches!(
            err,
            Err(crate::error::DataError::InvalidTankCapacity { .. })
        ));
    }

    #[test]
    fn weight_rows_exist_only_in_the_toll_variant() {
        let network = test_utils::toll_line_network();
        let costs = CostSchedule::default();

        let fuel = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
            .build()
            .unwrap();
        let tolls = ModelBuilder::new(&network, &costs, ModelVariant::FuelTolls)
            .build()
            .unwrap();

        assert!(!fuel.constraints().iter().any(|c| c.label().starts_with("weight_")));
        assert!(tolls.constraints().iter().any(|c| c.label().starts_with("weight_start[")));
        assert!(tolls.constraints().iter().any(|c| c.label().starts_with("weight_balance[")));
        assert!(tolls.constraints().iter().any(|c| c.label().starts_with("toll_weight[")));
    }

    #[test]
    fn declared_weight_limits_become_rows() {
        let network = test_utils::toll_line_network();
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(&network, &costs, ModelVariant::FuelTolls)
            .build()
            .unwrap();

        assert!(
            model
                .constraints()
                .iter()
                .any(|c| c.label() == "weight_limit[V001,C002]")
        );
    }

    #[test]
    fn restricted_arcs_get_no_variables() {
        let mut builder = test_utils::line_builder(&[("C001", 10.0, 5.0), ("C002", 20.0, 5.0)]);
        builder.restrict_arc("V001", "C001", "C002");
        let network = builder.build().unwrap();
        let costs = CostSchedule::default();
        let model = ModelBuilder::new(&network, &costs, ModelVariant::Capacity)
            .build()
            .unwrap();

        let vehicle = network.find_vehicle("V001").unwrap();
        let near = network.find_node("C001").unwrap();
        let far = network.find_node("C002").unwrap();
        assert!(
            model
                .var(&VarKey::ArcUse {
                    vehicle,
                    from: near,
                    to: far
                })
                .is_none()
        );
        assert!(
            model
                .var(&VarKey::ArcUse {
                    vehicle,
                    from: far,
                    to: near
                })
                .is_some()
        );
    }

    #[test]
    fn objective_prices_activation_distance_and_fuel() {
        let network = test_utils::fuel_line_network();
        let costs = CostSchedule {
            fixed_per_vehicle: 1_000.0,
            per_km: 10.0,
            average_speed_kmh: 60.0,
        };
        let model = ModelBuilder::new(&network, &costs, ModelVariant::Fuel)
            .build()
            .unwrap();

        let vehicle = network.find_vehicle("V001").unwrap();
        let used = model.var(&VarKey::VehicleUsed { vehicle }).unwrap();
        let station = network.find_node("E001").unwrap();
        let refuel = model.var(&VarKey::Refuel { vehicle, node: station }).unwrap();

        let objective = model.objective();
        assert!(objective.terms().contains(&(used, 1_000.0)));
        let station_price = network.node(station).fuel_price().unwrap();
        assert!(objective.terms().contains(&(refuel, station_price)));
    }
}
