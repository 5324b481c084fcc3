use std::path::PathBuf;

/// Whether split scores are computed once at the root or re-computed for
/// every subtree.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[clap(rename_all = "kebab-case")]
pub enum SplitStrategy {
    Static,
    DynamicPerSubtree,
}

/// The score assigned to a candidate selector over an element span:
/// `MaxCover` counts the elements the selector decides (|T| + |F|),
/// `Gini` is the Gini impurity of the {T, F, X} partition, and `Frequency`
/// counts the elements whose precondition mentions the selector at all.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[clap(rename_all = "kebab-case")]
pub enum SplitMetric {
    MaxCover,
    Gini,
    Frequency,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[clap(rename_all = "kebab-case")]
pub enum OptimizationDirection {
    Minimize,
    Maximize,
}

/// Construction options for the match tree.
#[derive(Debug, Clone)]
pub struct MatchTreeOptions {
    /// Soft cap on the number of selector nodes; placeholders left when the
    /// cap is reached become imperfect generator leaves.
    pub max_num_nodes: usize,
    pub split_strategy: SplitStrategy,
    pub split_metric: SplitMetric,
    pub optimization_direction: OptimizationDirection,
    pub enable_dump_dot_file: bool,
    pub output_dot_file: PathBuf,
}

impl Default for MatchTreeOptions {
    fn default() -> Self {
        Self {
            max_num_nodes: usize::MAX,
            split_strategy: SplitStrategy::DynamicPerSubtree,
            split_metric: SplitMetric::MaxCover,
            optimization_direction: OptimizationDirection::Maximize,
            enable_dump_dot_file: false,
            output_dot_file: PathBuf::from("match_tree.dot"),
        }
    }
}
