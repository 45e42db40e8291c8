pub mod results;
pub mod status;
pub mod types;

pub use results::{ScanResults, TaskRunResults, TestOutput, Vulnerabilities};
pub use status::{status_from_conditions, RunStatus};
pub use types::{
    Condition, ObjectMeta, Param, ParamValue, PipelineDefinition, PipelineRunRecord,
    PipelineRunStatus, PipelineSpec, PipelineTask, SkippedTask, StepState, TaskRunRecord,
    TaskRunResult, TaskRunStatus, WhenExpression,
};
