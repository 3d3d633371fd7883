#![forbid(unsafe_code)]

//! Concrete distribution-valued demand elements.

use std::fmt;

use netdemand_undo::ElementId;

use crate::error::Result;
use crate::gateway::DemandDistribution;
use crate::store::{Distribution, DistributionHandle};

/// The kinds of demand element that hold a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    /// Weighted choice between vehicle types.
    VType,
    /// Weighted choice between routes.
    Route,
}

impl DistributionKind {
    /// XML tag of the distribution element.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::VType => "vTypeDistribution",
            Self::Route => "routeDistribution",
        }
    }

    /// XML tag of the elements its keys refer to.
    #[must_use]
    pub const fn member_tag(self) -> &'static str {
        match self {
            Self::VType => "vType",
            Self::Route => "route",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

macro_rules! distribution_element {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            element: ElementId,
            id: String,
            distribution: DistributionHandle,
        }

        impl $name {
            /// Create an empty distribution element.
            #[must_use]
            pub fn new(element: ElementId, id: impl Into<String>) -> Self {
                Self::with_distribution(element, id, Distribution::new())
            }

            /// Create an element with initial contents.
            #[must_use]
            pub fn with_distribution(
                element: ElementId,
                id: impl Into<String>,
                distribution: Distribution,
            ) -> Self {
                Self {
                    element,
                    id: id.into(),
                    distribution: DistributionHandle::new(distribution),
                }
            }

            /// Create an element from a stored attribute string.
            pub fn from_attribute(
                element: ElementId,
                id: impl Into<String>,
                text: &str,
            ) -> Result<Self> {
                Ok(Self::with_distribution(
                    element,
                    id,
                    Distribution::parse_attribute(text)?,
                ))
            }

            /// The element's id in the demand file.
            #[must_use]
            pub fn id(&self) -> &str {
                &self.id
            }
        }

        impl DemandDistribution for $name {
            fn element_id(&self) -> ElementId {
                self.element
            }

            fn kind(&self) -> DistributionKind {
                $kind
            }

            fn distribution_handle(&self) -> &DistributionHandle {
                &self.distribution
            }
        }
    };
}

distribution_element!(
    /// A `vTypeDistribution`: vehicle-type ids with weights.
    VTypeDistribution,
    DistributionKind::VType
);

distribution_element!(
    /// A `routeDistribution`: route ids with weights.
    RouteDistribution,
    DistributionKind::Route
);
