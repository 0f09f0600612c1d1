pub mod configuration;

pub mod io {
    pub mod labeledpoints;
    pub mod probegeometry;
}

pub mod manager {
    pub mod managererror;
    pub mod manager;
}

pub mod math {
    pub mod kernelerror;
    pub mod strategy;

    pub mod piecewisepolynomial {
        pub mod segmentsearch;
        pub mod piecewisepolynomialtable;
        pub mod measurefunctionmanager;
    }

    pub mod standardization {
        pub mod standardization;
        pub mod constrainedstandardizer;
    }
}

pub mod verification {
    pub mod strategyequivalence;
}
