//! Annotatable record variants
//!
//! A closed set of record shapes the annotation engine knows how to
//! project. Editors build one of these from whatever row the user selected
//! and hand it to the engine; endpoint ids are resolved against the dataset
//! (map view) or the network graph (diagram view) at render time.

/// Named relationship a record has to another record for annotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRole {
    Source1,
    Source2,
    Destination,
    Upstream,
    Downstream,
}

impl EndpointRole {
    /// Role name used in composed annotation labels
    pub fn label(self) -> &'static str {
        match self {
            EndpointRole::Source1 => "source 1",
            EndpointRole::Source2 => "source 2",
            EndpointRole::Destination => "destination",
            EndpointRole::Upstream => "upstream",
            EndpointRole::Downstream => "downstream",
        }
    }

    /// Whether this role is the far end connecting lines are drawn to
    ///
    /// Operational rights connect each source to the destination; reaches
    /// connect upstream to downstream.
    pub fn is_primary(self) -> bool {
        matches!(self, EndpointRole::Destination | EndpointRole::Downstream)
    }
}

/// A record the annotation engine can project onto a view
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotatableRecord {
    /// Single-anchor record: its own id carries the geo shape / node
    Point { id: String, name: String },
    /// Operational right with up to two sources and a destination, plus
    /// intervening structures along the water path
    OperationalRight {
        id: String,
        name: String,
        source1: Option<String>,
        source2: Option<String>,
        destination: Option<String>,
        intervening: Vec<String>,
    },
    /// Instream-flow reach spanning upstream to downstream structures
    InstreamReach {
        id: String,
        name: String,
        upstream: Option<String>,
        downstream: Option<String>,
    },
}

impl AnnotatableRecord {
    /// Record identifier
    pub fn id(&self) -> &str {
        match self {
            AnnotatableRecord::Point { id, .. }
            | AnnotatableRecord::OperationalRight { id, .. }
            | AnnotatableRecord::InstreamReach { id, .. } => id,
        }
    }

    /// Record display name
    pub fn name(&self) -> &str {
        match self {
            AnnotatableRecord::Point { name, .. }
            | AnnotatableRecord::OperationalRight { name, .. }
            | AnnotatableRecord::InstreamReach { name, .. } => name,
        }
    }

    /// Whether this record has more than one logical endpoint
    ///
    /// Multi-endpoint records get role-qualified annotation labels.
    pub fn is_multi_endpoint(&self) -> bool {
        !matches!(self, AnnotatableRecord::Point { .. })
    }

    /// Endpoint roles and their target record ids, in declaration order
    ///
    /// Unset endpoints are omitted; a `Point` record has no named
    /// endpoints (its single anchor is its own id).
    pub fn endpoints(&self) -> Vec<(EndpointRole, &str)> {
        let mut out = Vec::new();
        match self {
            AnnotatableRecord::Point { .. } => {}
            AnnotatableRecord::OperationalRight {
                source1,
                source2,
                destination,
                ..
            } => {
                if let Some(id) = source1 {
                    out.push((EndpointRole::Source1, id.as_str()));
                }
                if let Some(id) = source2 {
                    out.push((EndpointRole::Source2, id.as_str()));
                }
                if let Some(id) = destination {
                    out.push((EndpointRole::Destination, id.as_str()));
                }
            }
            AnnotatableRecord::InstreamReach {
                upstream,
                downstream,
                ..
            } => {
                if let Some(id) = upstream {
                    out.push((EndpointRole::Upstream, id.as_str()));
                }
                if let Some(id) = downstream {
                    out.push((EndpointRole::Downstream, id.as_str()));
                }
            }
        }
        out
    }

    /// Intervening structure ids along an operational right's water path
    pub fn intervening(&self) -> &[String] {
        match self {
            AnnotatableRecord::OperationalRight { intervening, .. } => intervening,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_in_declaration_order() {
        let right = AnnotatableRecord::OperationalRight {
            id: "op1".into(),
            name: "Exchange".into(),
            source1: Some("res1".into()),
            source2: None,
            destination: Some("div9".into()),
            intervening: vec!["s1".into()],
        };
        let eps = right.endpoints();
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0], (EndpointRole::Source1, "res1"));
        assert_eq!(eps[1], (EndpointRole::Destination, "div9"));
        assert_eq!(right.intervening(), ["s1".to_string()]);
    }

    #[test]
    fn test_point_record_has_no_named_endpoints() {
        let rec = AnnotatableRecord::Point {
            id: "g1".into(),
            name: "Gage".into(),
        };
        assert!(!rec.is_multi_endpoint());
        assert!(rec.endpoints().is_empty());
        assert!(rec.intervening().is_empty());
    }

    #[test]
    fn test_primary_roles() {
        assert!(EndpointRole::Destination.is_primary());
        assert!(EndpointRole::Downstream.is_primary());
        assert!(!EndpointRole::Source1.is_primary());
        assert!(!EndpointRole::Upstream.is_primary());
    }
}
