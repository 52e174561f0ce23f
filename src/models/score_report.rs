//! Score report with overall grade

use serde::Serialize;

/// Quantum-readiness grade band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "Weak Legacy")]
    WeakLegacy,
    #[serde(rename = "Modern, But Insecure Long-Term")]
    ModernInsecureLongTerm,
    #[serde(rename = "Transition-Ready")]
    TransitionReady,
    #[serde(rename = "Quantum Experimental")]
    QuantumExperimental,
}

impl Grade {
    /// Get the display string for this grade
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Critical => "Critical",
            Grade::WeakLegacy => "Weak Legacy",
            Grade::ModernInsecureLongTerm => "Modern, But Insecure Long-Term",
            Grade::TransitionReady => "Transition-Ready",
            Grade::QuantumExperimental => "Quantum Experimental",
        }
    }

    /// One-line explanation of the band
    pub fn description(&self) -> &'static str {
        match self {
            Grade::Critical => "Critically vulnerable today",
            Grade::WeakLegacy => "Relies on legacy cryptography",
            Grade::ModernInsecureLongTerm => "Secure now, exposed to harvest-now-decrypt-later",
            Grade::TransitionReady => "Ready to adopt post-quantum cryptography",
            Grade::QuantumExperimental => "Deploys post-quantum cryptography",
        }
    }

    /// Calculate grade from a score (0-100)
    ///
    /// Total over every `u32`; the top band also covers 100 and anything a
    /// future category could push beyond it.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => Grade::Critical,
            30..=59 => Grade::WeakLegacy,
            60..=79 => Grade::ModernInsecureLongTerm,
            80..=95 => Grade::TransitionReady,
            _ => Grade::QuantumExperimental,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Points per scoring category.
///
/// Every category is always present so the serialized schema stays stable;
/// categories that are not scored yet hold 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub tls_version_hygiene: u32,
    pub forward_secrecy: u32,
    #[serde(rename = "hybridPQKeyExchange")]
    pub hybrid_pq_key_exchange: u32,
    #[serde(rename = "certificatePQReadiness")]
    pub certificate_pq_readiness: u32,
    pub hash_algorithm_hygiene: u32,
}

impl ScoreBreakdown {
    /// Category values in a fixed order
    pub fn values(&self) -> [u32; 5] {
        [
            self.tls_version_hygiene,
            self.forward_secrecy,
            self.hybrid_pq_key_exchange,
            self.certificate_pq_readiness,
            self.hash_algorithm_hygiene,
        ]
    }

    /// (label, points) pairs for display
    pub fn entries(&self) -> [(&'static str, u32); 5] {
        [
            ("TLS version hygiene", self.tls_version_hygiene),
            ("Forward secrecy", self.forward_secrecy),
            ("Hybrid PQ key exchange", self.hybrid_pq_key_exchange),
            ("Certificate PQ readiness", self.certificate_pq_readiness),
            ("Hash algorithm hygiene", self.hash_algorithm_hygiene),
        ]
    }

    pub fn total(&self) -> u32 {
        self.values().iter().sum()
    }
}

/// Final scored report for one probe result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    score: u32,
    grade: Grade,
    breakdown: ScoreBreakdown,
    recommendations: Vec<String>,
    notes: Vec<String>,
}

impl ScoreReport {
    /// Build a report; score and grade are derived from the breakdown
    pub fn new(breakdown: ScoreBreakdown, recommendations: Vec<String>, notes: Vec<String>) -> Self {
        let score = breakdown.total();
        Self {
            score,
            grade: Grade::from_score(score),
            breakdown,
            recommendations,
            notes,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_band_edges() {
        assert_eq!(Grade::from_score(0), Grade::Critical);
        assert_eq!(Grade::from_score(29), Grade::Critical);
        assert_eq!(Grade::from_score(30), Grade::WeakLegacy);
        assert_eq!(Grade::from_score(59), Grade::WeakLegacy);
        assert_eq!(Grade::from_score(60), Grade::ModernInsecureLongTerm);
        assert_eq!(Grade::from_score(79), Grade::ModernInsecureLongTerm);
        assert_eq!(Grade::from_score(80), Grade::TransitionReady);
        assert_eq!(Grade::from_score(95), Grade::TransitionReady);
        assert_eq!(Grade::from_score(96), Grade::QuantumExperimental);
        assert_eq!(Grade::from_score(99), Grade::QuantumExperimental);
        assert_eq!(Grade::from_score(100), Grade::QuantumExperimental);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = Grade::from_score(0);
        for score in 1..=100 {
            let grade = Grade::from_score(score);
            assert!(grade >= previous, "grade dropped at score {}", score);
            previous = grade;
        }
    }

    #[test]
    fn test_report_derives_score_from_breakdown() {
        let breakdown = ScoreBreakdown {
            tls_version_hygiene: 15,
            forward_secrecy: 20,
            ..Default::default()
        };
        let report = ScoreReport::new(breakdown, vec![], vec![]);
        assert_eq!(report.score(), 35);
        assert_eq!(report.grade(), Grade::WeakLegacy);
    }

    #[test]
    fn test_breakdown_serializes_every_category() {
        let json = serde_json::to_value(ScoreBreakdown::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 5);
        for key in [
            "tlsVersionHygiene",
            "forwardSecrecy",
            "hybridPQKeyExchange",
            "certificatePQReadiness",
            "hashAlgorithmHygiene",
        ] {
            assert_eq!(object[key], 0, "missing {}", key);
        }
    }
}
