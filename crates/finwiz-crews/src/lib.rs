//! The FinWiz research crews
//!
//! Four crews share one design: agents and tasks defined in YAML, the agent
//! handbook appended to every backstory, and tasks run one after another
//! with earlier outputs passed forward as context.
//!
//! | Crew | Focus |
//! |---|---|
//! | `stock` | Equities with high growth potential |
//! | `etf` | Funds, their holdings and costs |
//! | `crypto` | Digital assets and market technicals |
//! | `report` | Integrates the other three into one allocation |
//!
//! ```rust,ignore
//! use finwiz_core::{Agent, Domain, FlowInputs};
//! use finwiz_crews::CrewFactory;
//!
//! let factory = CrewFactory::new(runtime, toolkit);
//! let crew = factory.build(Domain::Stock)?;
//! let mut ctx = FlowInputs::now().to_context();
//! let thesis = crew.process(String::new(), &mut ctx).await?;
//! ```

pub mod crew;
pub mod definition;
pub mod error;
pub mod factory;

pub use crew::{Crew, CrewOutput, TaskOutput, strip_code_fence};
pub use definition::{AGENT_HANDBOOK, load as load_definition};
pub use error::{CrewError, Result};
pub use factory::CrewFactory;
