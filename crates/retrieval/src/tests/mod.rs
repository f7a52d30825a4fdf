//! Shared test doubles and end-to-end pipeline scenarios.


mod scenarios;
