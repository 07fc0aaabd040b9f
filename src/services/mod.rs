pub mod aggregator;
pub mod inverter;
pub mod normalizer;
pub mod pv_model;
pub mod pvgis_service;
