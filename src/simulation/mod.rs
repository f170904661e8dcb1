pub mod states;
pub mod params;
pub mod body;
pub mod star;
pub mod orbit;
pub mod transit;
pub mod forces;
pub mod integrator;
pub mod collisions;
pub mod diagnostics;
pub mod events;
pub mod system;
pub mod scenario;
