/// Arrow schema definitions for the model input row.
pub mod input {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;

    use crate::features::{FEATURE_NAMES, FeatureVector};

    /// Schema of the training frame, column for column.
    pub fn feature_schema() -> Schema {
        Schema::new(vec![
            Field::new(FEATURE_NAMES[0], DataType::Int64, false),
            Field::new(FEATURE_NAMES[1], DataType::Int64, false),
            Field::new(FEATURE_NAMES[2], DataType::Int64, false),
            Field::new(FEATURE_NAMES[3], DataType::Float64, false),
        ])
    }

    /// Schema of the human-readable input echo (Sex and T stage as labels).
    pub fn display_schema() -> Schema {
        Schema::new(vec![
            Field::new(FEATURE_NAMES[0], DataType::Int64, false),
            Field::new(FEATURE_NAMES[1], DataType::Utf8, false),
            Field::new(FEATURE_NAMES[2], DataType::Utf8, false),
            Field::new(FEATURE_NAMES[3], DataType::Float64, false),
        ])
    }

    /// One-row batch with the training dtypes.
    pub fn feature_batch(features: &FeatureVector) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(
            Arc::new(feature_schema()),
            vec![
                Arc::new(Int64Array::from(vec![features.age_numeric()])),
                Arc::new(Int64Array::from(vec![features.sex_code()])),
                Arc::new(Int64Array::from(vec![features.t_code()])),
                Arc::new(Float64Array::from(vec![features.lnr()])),
            ],
        )
    }

    /// One-row batch for display: `Sex_Code` as "Male"/"Female", `T_Code` as "T1".."T4".
    pub fn display_batch(features: &FeatureVector) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(
            Arc::new(display_schema()),
            vec![
                Arc::new(Int64Array::from(vec![features.age_numeric()])),
                Arc::new(StringArray::from(vec![features.sex().as_str()])),
                Arc::new(StringArray::from(vec![features.t_stage().as_str()])),
                Arc::new(Float64Array::from(vec![features.lnr()])),
            ],
        )
    }
}
