//! The course syllabus (temario) used as classification reference and
//! prompt context.

/// Física I, Universidad de Buenos Aires.
pub const SYLLABUS: &str = "
FÍSICA I - UNIVERSIDAD DE BUENOS AIRES

UNIDAD 1: CINEMÁTICA
- Movimiento en una dimensión
- Movimiento en dos y tres dimensiones
- Movimiento circular
- Movimiento relativo

UNIDAD 2: DINÁMICA
- Leyes de Newton
- Fuerzas y diagramas de cuerpo libre
- Fricción y resistencia
- Movimiento circular dinámico

UNIDAD 3: TRABAJO Y ENERGÍA
- Trabajo mecánico
- Energía cinética y potencial
- Conservación de la energía
- Potencia

UNIDAD 4: ONDAS Y SONIDO
- Movimiento armónico simple
- Ondas mecánicas
- Efecto Doppler
- Interferencia y resonancia

UNIDAD 5: MECÁNICA DE FLUIDOS
- Estática de fluidos
- Dinámica de fluidos
- Ecuación de Bernoulli
";
