pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod path_finder;
pub mod record;
pub mod runner;
pub mod traits;
pub mod tree;
pub mod writer;

// Export input model and reader trait
pub use record::{NodeId, NodeRecord, PathQuery, TreeInput};
pub use traits::InputReader;

// Export errors
pub use error::{BuildError, BuildWarning, ParseError, PathError};

// Export tree construction
pub use tree::{build, BuildReport, Node, NodeIndex, Tree, TreeBuilder};

// Export path search
pub use path_finder::{find_path, find_path_with, try_find_path, try_find_path_with, PathStrategy};

// Export readers and writers
pub use parser::{parse_input, parse_jsonl, parse_text, InputFormat, JsonlInputReader, TextInputReader};
pub use writer::{format_path, InputWriter, PathWriter};

// Export configuration, driver and generator
pub use config::{Config, ConfigOverrides};
pub use generator::TreeGenerator;
pub use runner::{run, run_queries, RunSummary};
