//! Cost weights used when estimating nodes the translator inserts itself.
//!
//! Passed explicitly to the cost model; nothing here is process-global.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Cost of processing one tuple.
    pub cpu_tuple_cost: f64,

    /// Cost of evaluating one operator or function call.
    pub cpu_operator_cost: f64,

    /// Cost of a non-sequential page fetch (sequential fetch = 1.0).
    pub random_page_cost: f64,

    /// Memory available to one sort before it spills to runs, in KiB.
    pub sort_mem_kb: usize,

    /// Page size in bytes.
    pub block_size: usize,

    /// Per-tuple header overhead used when sizing sort input.
    pub tuple_overhead_bytes: usize,

    /// Assumed fraction of input rows surviving a set operation.
    pub setop_output_fraction: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cpu_tuple_cost: 0.01,
            cpu_operator_cost: 0.0025,
            random_page_cost: 4.0,
            sort_mem_kb: 1024,
            block_size: 8192,
            tuple_overhead_bytes: 32,
            setop_output_fraction: 0.1,
        }
    }
}

impl CostConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RELPLAN_CPU_TUPLE_COST`
    /// - `RELPLAN_CPU_OPERATOR_COST`
    /// - `RELPLAN_RANDOM_PAGE_COST`
    /// - `RELPLAN_SORT_MEM_KB`
    /// - `RELPLAN_BLOCK_SIZE`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RELPLAN_CPU_TUPLE_COST") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.cpu_tuple_cost = v;
            }
        }

        if let Ok(s) = std::env::var("RELPLAN_CPU_OPERATOR_COST") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.cpu_operator_cost = v;
            }
        }

        if let Ok(s) = std::env::var("RELPLAN_RANDOM_PAGE_COST") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.random_page_cost = v;
            }
        }

        if let Ok(s) = std::env::var("RELPLAN_SORT_MEM_KB") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.sort_mem_kb = v;
            }
        }

        if let Ok(s) = std::env::var("RELPLAN_BLOCK_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                if v > 0 {
                    cfg.block_size = v;
                }
            }
        }

        cfg
    }

    pub fn sort_mem_bytes(&self) -> f64 {
        self.sort_mem_kb as f64 * 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CostConfig::default();
        assert_eq!(cfg.cpu_tuple_cost, 0.01);
        assert_eq!(cfg.cpu_operator_cost, 0.0025);
        assert_eq!(cfg.sort_mem_bytes(), 1024.0 * 1024.0);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "cpu_tuple_cost": 1.0,
            "cpu_operator_cost": 0.5,
            "random_page_cost": 2.0,
            "sort_mem_kb": 64,
            "block_size": 4096,
            "tuple_overhead_bytes": 0,
            "setop_output_fraction": 0.5
        }"#;
        let cfg: CostConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.cpu_operator_cost, 0.5);
        assert_eq!(cfg.block_size, 4096);
    }

    #[test]
    fn test_sort_mem_bytes_large_setting() {
        let cfg = CostConfig {
            sort_mem_kb: usize::MAX / 512,
            ..CostConfig::default()
        };
        let bytes = cfg.sort_mem_bytes();
        assert!(bytes.is_finite());
        assert_eq!(bytes, (usize::MAX / 512) as f64 * 1024.0);
    }

    #[test]
    fn test_from_env_overlay() {
        // Only test in this crate touching the process environment.
        let vars = [
            ("RELPLAN_CPU_TUPLE_COST", "0.5"),
            ("RELPLAN_CPU_OPERATOR_COST", "cheap"),
            ("RELPLAN_RANDOM_PAGE_COST", "2.5"),
            ("RELPLAN_SORT_MEM_KB", "64"),
            ("RELPLAN_BLOCK_SIZE", "0"),
        ];
        for (k, v) in vars {
            std::env::set_var(k, v);
        }

        let cfg = CostConfig::from_env();
        let defaults = CostConfig::default();
        assert_eq!(cfg.cpu_tuple_cost, 0.5);
        assert_eq!(cfg.cpu_operator_cost, defaults.cpu_operator_cost);
        assert_eq!(cfg.random_page_cost, 2.5);
        assert_eq!(cfg.sort_mem_kb, 64);
        assert_eq!(cfg.block_size, defaults.block_size);

        std::env::set_var("RELPLAN_BLOCK_SIZE", "4096");
        std::env::set_var("RELPLAN_SORT_MEM_KB", "-1");
        let cfg = CostConfig::from_env();
        assert_eq!(cfg.block_size, 4096);
        assert_eq!(cfg.sort_mem_kb, defaults.sort_mem_kb);

        for (k, _) in vars {
            std::env::remove_var(k);
        }
        assert_eq!(CostConfig::from_env(), defaults);
    }
}
