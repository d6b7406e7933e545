pub mod prediction_types;
